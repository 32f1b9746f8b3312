//! Cache-backed fetch pipeline for upstream XML documents.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::cache::TtlCache;
use crate::document::{parse_document, Document, RateDocument};
use crate::error::RatesResult;
use crate::metrics::FetchMetrics;
use crate::transport::Transport;

/// Cache of parsed documents keyed by fetch URL.
pub type DocumentCache = TtlCache<String, RateDocument>;

/// Fetches typed documents, serving repeats from the cache.
///
/// Failed fetches never touch the cache, so a previous document for the URL
/// stays served until its TTL runs out. Concurrent misses on the same URL
/// each go upstream.
pub struct XmlFetcher {
    transport: Arc<dyn Transport>,
    cache: Arc<DocumentCache>,
    ttl: Duration,
    metrics: Arc<FetchMetrics>,
}

impl XmlFetcher {
    /// Create a fetcher storing documents in `cache` for `ttl`.
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<DocumentCache>, ttl: Duration) -> Self {
        Self {
            transport,
            cache,
            ttl,
            metrics: Arc::new(FetchMetrics::new()),
        }
    }

    /// Report into an existing metrics instance.
    pub fn with_metrics(mut self, metrics: Arc<FetchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Get the document at `url`, from the cache if still fresh.
    #[instrument(skip(self), fields(kind = D::KIND))]
    pub async fn fetch<D: Document>(&self, url: &str) -> RatesResult<Arc<D>> {
        if let Some(doc) = self.cache.get(&url.to_string()).and_then(D::from_cached) {
            debug!("Cache hit");
            self.metrics.cache_hit();
            return Ok(doc);
        }

        debug!("Cache miss");
        self.metrics.cache_miss();

        let doc = match self.load::<D>(url).await {
            Ok(doc) => Arc::new(doc),
            Err(e) => {
                warn!(transport = self.transport.name(), error = %e, "Upstream fetch failed");
                self.metrics.upstream_failure();
                return Err(e);
            }
        };

        self.cache
            .set(url.to_string(), D::into_cached(Arc::clone(&doc)), self.ttl);
        info!(ttl_secs = self.ttl.as_secs(), "Cached upstream document");

        Ok(doc)
    }

    async fn load<D: Document>(&self, url: &str) -> RatesResult<D> {
        let body = self.transport.get(url).await?;
        Ok(parse_document(&body)?)
    }

    /// Shared cache handle.
    pub fn cache(&self) -> &Arc<DocumentCache> {
        &self.cache
    }

    /// Shared metrics handle.
    pub fn metrics(&self) -> &Arc<FetchMetrics> {
        &self.metrics
    }
}
