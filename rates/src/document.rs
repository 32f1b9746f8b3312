//! Upstream XML documents and their decoding.
//!
//! The feed serves `windows-1251` and says so in the XML declaration, so the
//! body is transcoded to UTF-8 according to its BOM or declared charset before
//! it is deserialized.

use std::sync::Arc;

use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Daily snapshot of all tracked currencies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailySnapshot {
    #[serde(rename = "@Date", default)]
    pub date: String,
    #[serde(rename = "Valute", default)]
    pub entries: Vec<CurrencyEntry>,
}

/// One currency in a daily snapshot.
///
/// Missing elements read as empty strings so one incomplete entry does not
/// fail the whole snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrencyEntry {
    #[serde(rename = "CharCode", default)]
    pub char_code: String,
    /// Decimal-comma value, see [`crate::parse::parse_rate`].
    #[serde(rename = "Value", default)]
    pub raw_value: String,
}

/// Date-ranged observations for a single currency.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoricalSeries {
    #[serde(rename = "Record", default)]
    pub entries: Vec<HistoryRecord>,
}

/// One observation in a historical series.
///
/// Missing fields read as empty strings; an empty value is then skipped
/// like any other unparsable one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "@Date", default)]
    pub date: String,
    /// Decimal-comma value, see [`crate::parse::parse_rate`].
    #[serde(rename = "Value", default)]
    pub raw_value: String,
}

/// A parsed history point as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateHistoryPoint {
    /// `DD.MM.YYYY`, as received from upstream.
    pub date: String,
    pub rate: f64,
}

/// Any document the fetch pipeline can cache.
#[derive(Debug, Clone)]
pub enum RateDocument {
    Daily(Arc<DailySnapshot>),
    History(Arc<HistoricalSeries>),
}

/// A document shape that can be stored in and recovered from a
/// [`RateDocument`].
pub trait Document: DeserializeOwned + Send + Sync + 'static {
    /// Shape name used in logs.
    const KIND: &'static str;

    fn into_cached(doc: Arc<Self>) -> RateDocument;

    fn from_cached(doc: RateDocument) -> Option<Arc<Self>>;
}

impl Document for DailySnapshot {
    const KIND: &'static str = "daily";

    fn into_cached(doc: Arc<Self>) -> RateDocument {
        RateDocument::Daily(doc)
    }

    fn from_cached(doc: RateDocument) -> Option<Arc<Self>> {
        match doc {
            RateDocument::Daily(doc) => Some(doc),
            _ => None,
        }
    }
}

impl Document for HistoricalSeries {
    const KIND: &'static str = "history";

    fn into_cached(doc: Arc<Self>) -> RateDocument {
        RateDocument::History(doc)
    }

    fn from_cached(doc: RateDocument) -> Option<Arc<Self>> {
        match doc {
            RateDocument::History(doc) => Some(doc),
            _ => None,
        }
    }
}

/// Decode a raw body and deserialize it as `D`.
pub fn parse_document<D: Document>(body: &[u8]) -> Result<D, ParseError> {
    let text = decode_body(body)?;
    Ok(quick_xml::de::from_str(&text)?)
}

/// Transcode a body to UTF-8 using its BOM, else the charset from its XML
/// declaration, else UTF-8.
pub fn decode_body(body: &[u8]) -> Result<String, ParseError> {
    let (encoding, bom_len) = match Encoding::for_bom(body) {
        Some(found) => found,
        None => (declared_encoding(body)?.unwrap_or(UTF_8), 0),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(&body[bom_len..])
        .map(|text| text.into_owned())
        .ok_or(ParseError::Decode {
            charset: encoding.name(),
        })
}

/// Encoding named by a leading `<?xml ...?>` declaration, if there is one.
///
/// A body that does not start with a declaration, or whose first event is
/// malformed, yields `None`; the deserializer reports the real error later.
fn declared_encoding(body: &[u8]) -> Result<Option<&'static Encoding>, ParseError> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();

    let decl = match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => decl,
        _ => return Ok(None),
    };

    match decl.encoding() {
        None => Ok(None),
        Some(Ok(label)) => Encoding::for_label(&label).map(Some).ok_or_else(|| {
            ParseError::UnsupportedCharset(String::from_utf8_lossy(&label).into_owned())
        }),
        Some(Err(e)) => Err(ParseError::UnsupportedCharset(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1251;

    const DAILY: &str = r#"<?xml version="1.0" encoding="windows-1251"?>
<ValCurs Date="18.10.2026" name="Foreign Currency Market">
    <Valute ID="R01239">
        <NumCode>978</NumCode>
        <CharCode>EUR</CharCode>
        <Nominal>1</Nominal>
        <Name>Евро</Name>
        <Value>100,00</Value>
    </Valute>
    <Valute ID="R01235">
        <NumCode>840</NumCode>
        <CharCode>USD</CharCode>
        <Nominal>1</Nominal>
        <Name>Доллар США</Name>
        <Value>91,23</Value>
    </Valute>
</ValCurs>"#;

    const HISTORY: &str = r#"<?xml version="1.0" encoding="windows-1251"?>
<ValCurs ID="R01235" DateRange1="01.01.2024" DateRange2="03.01.2024" name="Foreign Currency Market Dynamic">
    <Record Date="01.01.2024" Id="R01235"><Nominal>1</Nominal><Value>91,00</Value></Record>
    <Record Date="03.01.2024" Id="R01235"><Nominal>1</Nominal><Value>92,50</Value></Record>
</ValCurs>"#;

    fn cp1251(text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = WINDOWS_1251.encode(text);
        assert!(!had_errors);
        bytes.into_owned()
    }

    #[test]
    fn test_parse_daily_windows_1251() {
        let doc: DailySnapshot = parse_document(&cp1251(DAILY)).unwrap();

        assert_eq!(doc.date, "18.10.2026");
        assert_eq!(doc.entries.len(), 2);
        assert_eq!(doc.entries[1].char_code, "USD");
        assert_eq!(doc.entries[1].raw_value, "91,23");
    }

    #[test]
    fn test_parse_history() {
        let doc: HistoricalSeries = parse_document(&cp1251(HISTORY)).unwrap();

        assert_eq!(doc.entries.len(), 2);
        assert_eq!(doc.entries[0].date, "01.01.2024");
        assert_eq!(doc.entries[1].raw_value, "92,50");
    }

    #[test]
    fn test_decode_transcodes_cyrillic() {
        let text = decode_body(&cp1251(DAILY)).unwrap();
        assert!(text.contains("Доллар США"));
    }

    #[test]
    fn test_decode_defaults_to_utf8() {
        let body = "<ValCurs Date=\"18.10.2026\"><Valute><CharCode>USD</CharCode><Value>1</Value></Valute></ValCurs>";
        let doc: DailySnapshot = parse_document(body.as_bytes()).unwrap();
        assert_eq!(doc.entries[0].char_code, "USD");
    }

    #[test]
    fn test_decode_honours_bom() {
        let mut body = vec![0xEF, 0xBB, 0xBF];
        body.extend_from_slice("<?xml version=\"1.0\"?><ValCurs Date=\"x\"/>".as_bytes());

        let doc: DailySnapshot = parse_document(&body).unwrap();
        assert_eq!(doc.date, "x");
        assert!(doc.entries.is_empty());
    }

    #[test]
    fn test_unknown_charset() {
        let body = b"<?xml version=\"1.0\" encoding=\"klingon-8\"?><ValCurs/>";
        assert!(matches!(
            decode_body(body),
            Err(ParseError::UnsupportedCharset(label)) if label == "klingon-8"
        ));
    }

    #[test]
    fn test_invalid_bytes_for_charset() {
        let mut body = b"<?xml version=\"1.0\" encoding=\"utf-8\"?><ValCurs Date=\"".to_vec();
        body.push(0xFF);
        body.extend_from_slice(b"\"/>");

        assert!(matches!(decode_body(&body), Err(ParseError::Decode { .. })));
    }

    #[test]
    fn test_malformed_xml() {
        let result: Result<DailySnapshot, _> = parse_document(b"<ValCurs Date=\"x\"><Valute>");
        assert!(matches!(result, Err(ParseError::Xml(_))));
    }

    #[test]
    fn test_declared_charset_single_quotes() {
        let body = cp1251("<?xml version='1.0' encoding='windows-1251'?><ValCurs Date=\"Пн\"/>");

        assert_eq!(declared_encoding(&body).unwrap(), Some(WINDOWS_1251));
        assert!(decode_body(&body).unwrap().contains("Пн"));
    }

    #[test]
    fn test_declaration_without_encoding_is_utf8() {
        let body = "<?xml version=\"1.0\"?><ValCurs Date=\"Пн\"/>".as_bytes();

        assert_eq!(declared_encoding(body).unwrap(), None);
        assert!(decode_body(body).unwrap().contains("Пн"));
    }

    #[test]
    fn test_cached_shape_is_checked() {
        let daily = Arc::new(DailySnapshot {
            date: "18.10.2026".into(),
            entries: vec![],
        });
        let cached = DailySnapshot::into_cached(daily);

        assert!(HistoricalSeries::from_cached(cached.clone()).is_none());
        assert!(DailySnapshot::from_cached(cached).is_some());
    }
}
