//! Rate feed configuration.

use std::time::Duration;

/// Configuration for the rate feed client.
#[derive(Debug, Clone)]
pub struct RatesConfig {
    /// Daily snapshot endpoint.
    pub daily_url: String,
    /// Historical series endpoint, without query string.
    pub history_url: String,
    /// Currency looked up in the daily snapshot.
    pub currency_code: String,
    /// Upstream identifier of the same currency for historical queries.
    pub history_currency_id: String,
    /// Days before today included in the history.
    pub history_days: u32,
    /// Upstream request timeout.
    pub http_timeout: Duration,
    /// How long fetched documents are served from the cache.
    pub cache_ttl: Duration,
    /// User-Agent sent upstream, which rejects requests without one.
    pub user_agent: String,
    /// Offset of the upstream's local time from UTC, used to pick "today".
    pub upstream_utc_offset_hours: i32,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            daily_url: "https://www.cbr.ru/scripts/XML_daily.asp".to_string(),
            history_url: "https://www.cbr.ru/scripts/XML_dynamic.asp".to_string(),
            currency_code: "USD".to_string(),
            history_currency_id: "R01235".to_string(),
            history_days: 7,
            http_timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(60 * 60),
            user_agent: "Mozilla/5.0".to_string(),
            upstream_utc_offset_hours: 3,
        }
    }
}

impl RatesConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("RATES_DAILY_URL") {
            config.daily_url = url;
        }

        if let Ok(url) = std::env::var("RATES_HISTORY_URL") {
            config.history_url = url;
        }

        if let Ok(code) = std::env::var("RATES_CURRENCY_CODE") {
            config.currency_code = code;
        }

        if let Ok(id) = std::env::var("RATES_HISTORY_CURRENCY_ID") {
            config.history_currency_id = id;
        }

        if let Ok(days) = std::env::var("RATES_HISTORY_DAYS") {
            if let Ok(days) = days.parse() {
                config.history_days = days;
            }
        }

        if let Ok(secs) = std::env::var("RATES_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.http_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(secs) = std::env::var("RATES_CACHE_TTL_SECS") {
            if let Ok(secs) = secs.parse() {
                config.cache_ttl = Duration::from_secs(secs);
            }
        }

        if let Ok(agent) = std::env::var("RATES_USER_AGENT") {
            config.user_agent = agent;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.daily_url.is_empty() || self.history_url.is_empty() {
            return Err("Feed URLs cannot be empty".to_string());
        }

        if self.currency_code.is_empty() || self.history_currency_id.is_empty() {
            return Err("Currency code and history currency id are required".to_string());
        }

        if self.http_timeout.is_zero() {
            return Err("HTTP timeout cannot be zero".to_string());
        }

        if self.user_agent.is_empty() {
            return Err("User-Agent cannot be empty".to_string());
        }

        if !(-12..=14).contains(&self.upstream_utc_offset_hours) {
            return Err("Upstream UTC offset must be within -12..=14 hours".to_string());
        }

        Ok(())
    }
}
