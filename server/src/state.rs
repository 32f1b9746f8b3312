//! Shared handler state.

use std::sync::Arc;

use usdrub_rates::{CurrencyService, DocumentCache, HttpTransport, RatesConfig, Transport, XmlFetcher};

/// State shared by all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CurrencyService>,
}

impl AppState {
    /// Wire the service over `transport` with a fresh cache.
    pub fn new(transport: Arc<dyn Transport>, config: RatesConfig) -> Self {
        let cache = Arc::new(DocumentCache::new());
        let fetcher = XmlFetcher::new(transport, cache, config.cache_ttl);

        Self {
            service: Arc::new(CurrencyService::new(fetcher, config)),
        }
    }

    /// Wire the service over HTTP.
    pub fn from_config(config: RatesConfig) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(config.http_timeout, &config.user_agent)?;
        Ok(Self::new(Arc::new(transport), config))
    }
}
