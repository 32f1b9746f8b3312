//! Currency queries over the fetch pipeline.

use chrono::NaiveDate;
use tracing::{instrument, warn};

use crate::config::RatesConfig;
use crate::document::{DailySnapshot, HistoricalSeries, RateHistoryPoint};
use crate::error::{RatesError, RatesResult};
use crate::fetch::XmlFetcher;
use crate::parse::parse_rate;
use crate::time::{format_date, history_window, today_at_offset};

/// Answers rate queries for the configured currency.
///
/// Both snapshot queries fetch the daily document on their own; the second
/// one within the cache TTL is a cache hit.
pub struct CurrencyService {
    fetcher: XmlFetcher,
    config: RatesConfig,
}

impl CurrencyService {
    /// Create a new service.
    pub fn new(fetcher: XmlFetcher, config: RatesConfig) -> Self {
        Self { fetcher, config }
    }

    /// Get the current rate of the configured currency (USD by default).
    pub async fn get_usd_rate(&self) -> RatesResult<f64> {
        self.get_rate(&self.config.currency_code).await
    }

    /// Get the current rate of `code` from the daily snapshot.
    ///
    /// The first entry with an exactly matching code wins.
    #[instrument(skip(self))]
    pub async fn get_rate(&self, code: &str) -> RatesResult<f64> {
        let snapshot = self.fetcher.fetch::<DailySnapshot>(&self.config.daily_url).await?;

        let entry = snapshot
            .entries
            .iter()
            .find(|e| e.char_code == code)
            .ok_or_else(|| RatesError::NotFound {
                code: code.to_string(),
            })?;

        Ok(parse_rate(&entry.raw_value)?)
    }

    /// Get the date of the daily snapshot exactly as upstream wrote it.
    #[instrument(skip(self))]
    pub async fn get_rate_date(&self) -> RatesResult<String> {
        let snapshot = self.fetcher.fetch::<DailySnapshot>(&self.config.daily_url).await?;
        Ok(snapshot.date.clone())
    }

    /// Get the rate history for the trailing window ending today in the
    /// upstream's timezone.
    pub async fn get_usd_rate_history(&self) -> RatesResult<Vec<RateHistoryPoint>> {
        let today = today_at_offset(self.config.upstream_utc_offset_hours);
        self.get_usd_rate_history_at(today).await
    }

    /// Get the rate history for the window ending on `today`.
    ///
    /// Records whose value does not parse are skipped.
    #[instrument(skip(self))]
    pub async fn get_usd_rate_history_at(
        &self,
        today: NaiveDate,
    ) -> RatesResult<Vec<RateHistoryPoint>> {
        let url = self.history_url(today);
        let series = self.fetcher.fetch::<HistoricalSeries>(&url).await?;

        let history = series
            .entries
            .iter()
            .filter_map(|record| match parse_rate(&record.raw_value) {
                Ok(rate) => Some(RateHistoryPoint {
                    date: record.date.clone(),
                    rate,
                }),
                Err(e) => {
                    warn!(date = %record.date, error = %e, "Skipping history record");
                    None
                }
            })
            .collect();

        Ok(history)
    }

    /// Historical query URL for the window ending on `today`.
    pub fn history_url(&self, today: NaiveDate) -> String {
        let (start, end) = history_window(today, self.config.history_days);
        format!(
            "{}?date_req1={}&date_req2={}&VAL_NM_RQ={}",
            self.config.history_url,
            format_date(start),
            format_date(end),
            self.config.history_currency_id
        )
    }

    /// The underlying fetcher.
    pub fn fetcher(&self) -> &XmlFetcher {
        &self.fetcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::DocumentCache;
    use crate::transport::{MockResponse, MockTransport};
    use std::sync::Arc;

    const DAILY_URL: &str = "http://feed/daily";

    fn setup() -> (Arc<MockTransport>, CurrencyService) {
        let transport = Arc::new(MockTransport::new());
        let config = RatesConfig {
            daily_url: DAILY_URL.to_string(),
            history_url: "http://feed/dynamic".to_string(),
            ..Default::default()
        };
        let fetcher = XmlFetcher::new(
            transport.clone(),
            Arc::new(DocumentCache::new()),
            config.cache_ttl,
        );
        (transport, CurrencyService::new(fetcher, config))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
    }

    #[tokio::test]
    async fn test_get_usd_rate() {
        let (transport, service) = setup();
        transport.respond_body(
            DAILY_URL,
            r#"<ValCurs Date="18.10.2026">
                <Valute><CharCode>EUR</CharCode><Value>100,00</Value></Valute>
                <Valute><CharCode>USD</CharCode><Value>91,23</Value></Valute>
            </ValCurs>"#,
        );

        assert_eq!(service.get_usd_rate().await.unwrap(), 91.23);
    }

    #[tokio::test]
    async fn test_get_usd_rate_not_found() {
        let (transport, service) = setup();
        transport.respond_body(
            DAILY_URL,
            r#"<ValCurs Date="18.10.2026">
                <Valute><CharCode>EUR</CharCode><Value>100,00</Value></Valute>
            </ValCurs>"#,
        );

        let result = service.get_usd_rate().await;

        assert!(matches!(result, Err(RatesError::NotFound { code }) if code == "USD"));
    }

    #[tokio::test]
    async fn test_code_match_is_exact_and_first_wins() {
        let (transport, service) = setup();
        transport.respond_body(
            DAILY_URL,
            r#"<ValCurs Date="18.10.2026">
                <Valute><CharCode>usd</CharCode><Value>1,00</Value></Valute>
                <Valute><CharCode>USD</CharCode><Value>91,23</Value></Valute>
                <Valute><CharCode>USD</CharCode><Value>99,99</Value></Valute>
            </ValCurs>"#,
        );

        assert_eq!(service.get_usd_rate().await.unwrap(), 91.23);
    }

    #[tokio::test]
    async fn test_incomplete_entries_do_not_block_usd() {
        let (transport, service) = setup();
        transport.respond_body(
            DAILY_URL,
            r#"<ValCurs Date="18.10.2026">
                <Valute><CharCode>EUR</CharCode></Valute>
                <Valute><Value>1,00</Value></Valute>
                <Valute><CharCode>USD</CharCode><Value>91,23</Value></Valute>
            </ValCurs>"#,
        );

        assert_eq!(service.get_usd_rate().await.unwrap(), 91.23);
        assert_eq!(service.get_rate_date().await.unwrap(), "18.10.2026");
        assert!(matches!(
            service.get_rate("EUR").await,
            Err(RatesError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_unparsable_usd_rate_is_parse_error() {
        let (transport, service) = setup();
        transport.respond_body(
            DAILY_URL,
            r#"<ValCurs Date="18.10.2026">
                <Valute><CharCode>USD</CharCode><Value>n/a</Value></Valute>
            </ValCurs>"#,
        );

        assert!(matches!(
            service.get_usd_rate().await,
            Err(RatesError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_get_rate_date_passthrough() {
        let (transport, service) = setup();
        transport.respond_body(DAILY_URL, r#"<ValCurs Date="2026/10/18 (Sat)"></ValCurs>"#);

        let date = tokio_test::assert_ok!(service.get_rate_date().await);
        assert_eq!(date, "2026/10/18 (Sat)");
    }

    #[tokio::test]
    async fn test_snapshot_queries_share_one_fetch() {
        let (transport, service) = setup();
        transport.respond_body(
            DAILY_URL,
            r#"<ValCurs Date="18.10.2026">
                <Valute><CharCode>USD</CharCode><Value>91,23</Value></Valute>
            </ValCurs>"#,
        );

        tokio_test::assert_ok!(service.get_usd_rate().await);
        tokio_test::assert_ok!(service.get_rate_date().await);

        assert_eq!(transport.requests(DAILY_URL), 1);
    }

    #[tokio::test]
    async fn test_snapshot_fetch_error_propagates() {
        let (transport, service) = setup();
        transport.respond(DAILY_URL, MockResponse::Status(500));

        assert!(matches!(
            service.get_rate_date().await,
            Err(RatesError::Fetch(FetchError::Status { status: 500, .. }))
        ));
    }

    #[test]
    fn test_history_url() {
        let (_, service) = setup();

        assert_eq!(
            service.history_url(today()),
            "http://feed/dynamic?date_req1=27.12.2023&date_req2=03.01.2024&VAL_NM_RQ=R01235"
        );
    }

    #[tokio::test]
    async fn test_history_skips_bad_records() {
        let (transport, service) = setup();
        transport.respond_body(
            service.history_url(today()),
            r#"<ValCurs ID="R01235">
                <Record Date="01.01.2024" Id="R01235"><Nominal>1</Nominal><Value>91,00</Value></Record>
                <Record Date="02.01.2024" Id="R01235"><Nominal>1</Nominal><Value>bad</Value></Record>
                <Record Date="03.01.2024" Id="R01235"><Nominal>1</Nominal><Value>92,50</Value></Record>
            </ValCurs>"#,
        );

        let history = service.get_usd_rate_history_at(today()).await.unwrap();

        assert_eq!(
            history,
            vec![
                RateHistoryPoint {
                    date: "01.01.2024".to_string(),
                    rate: 91.0,
                },
                RateHistoryPoint {
                    date: "03.01.2024".to_string(),
                    rate: 92.5,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_history_skips_incomplete_records() {
        let (transport, service) = setup();
        transport.respond_body(
            service.history_url(today()),
            r#"<ValCurs ID="R01235">
                <Record Date="01.01.2024" Id="R01235"><Nominal>1</Nominal><Value>91,00</Value></Record>
                <Record Date="02.01.2024" Id="R01235"><Nominal>1</Nominal></Record>
                <Record Id="R01235"><Nominal>1</Nominal></Record>
                <Record Date="03.01.2024" Id="R01235"><Nominal>1</Nominal><Value>92,50</Value></Record>
            </ValCurs>"#,
        );

        let history = service.get_usd_rate_history_at(today()).await.unwrap();

        assert_eq!(
            history,
            vec![
                RateHistoryPoint {
                    date: "01.01.2024".to_string(),
                    rate: 91.0,
                },
                RateHistoryPoint {
                    date: "03.01.2024".to_string(),
                    rate: 92.5,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_history() {
        let (transport, service) = setup();
        transport.respond_body(service.history_url(today()), r#"<ValCurs ID="R01235"/>"#);

        let history = service.get_usd_rate_history_at(today()).await.unwrap();

        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_history_fetch_error_propagates() {
        let (transport, service) = setup();
        transport.respond(service.history_url(today()), MockResponse::Timeout);

        assert!(matches!(
            service.get_usd_rate_history_at(today()).await,
            Err(RatesError::Fetch(FetchError::Timeout { .. }))
        ));
    }
}
