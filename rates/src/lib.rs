//! usdrub rate feed client
//!
//! Fetches the USD/RUB rate and its recent history from the Central Bank of
//! Russia XML feed.
//!
//! # Features
//!
//! - Per-URL TTL cache of parsed documents, shared explicitly
//! - Charset-aware XML decoding (`windows-1251` upstream)
//! - Decimal-comma rate parsing
//! - Partial history on malformed records
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use usdrub_rates::{CurrencyService, DocumentCache, HttpTransport, RatesConfig, XmlFetcher};
//!
//! let config = RatesConfig::default();
//! let transport = Arc::new(HttpTransport::new(config.http_timeout, &config.user_agent)?);
//! let fetcher = XmlFetcher::new(transport, Arc::new(DocumentCache::new()), config.cache_ttl);
//! let service = CurrencyService::new(fetcher, config);
//!
//! let rate = service.get_usd_rate().await?;
//! let history = service.get_usd_rate_history().await?;
//! ```

pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod parse;
pub mod service;
pub mod time;
pub mod transport;

pub use cache::{CacheStats, TtlCache};
pub use config::RatesConfig;
pub use document::{DailySnapshot, HistoricalSeries, RateDocument, RateHistoryPoint};
pub use error::{FetchError, ParseError, RatesError, RatesResult};
pub use fetch::{DocumentCache, XmlFetcher};
pub use metrics::{FetchMetrics, MetricsSnapshot};
pub use parse::parse_rate;
pub use service::CurrencyService;
pub use transport::{HttpTransport, Transport};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::{MockResponse, MockTransport};
