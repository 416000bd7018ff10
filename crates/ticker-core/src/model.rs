//! Wire types returned by the ticker endpoint.

use serde::{Deserialize, Serialize};

/// One short news item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Headline text.
    pub text: String,
    /// Short name of the author or source.
    pub short: String,
    /// Optional article URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Ticker {
    pub fn new(text: impl Into<String>, short: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            short: short.into(),
            link: None,
        }
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Response body of one fetch: `{"tickers": [...]}`.
///
/// A batch always replaces the previous one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerBatch {
    pub tickers: Vec<Ticker>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_parses_optional_link() {
        let body = r#"{"tickers":[
            {"text":"Mann beißt Hund","short":"ssi"},
            {"text":"Hund beißt zurück","short":"dan","link":"https://example.com/a"}
        ]}"#;

        let batch: TickerBatch = serde_json::from_str(body).unwrap();
        assert_eq!(batch.tickers.len(), 2);
        assert_eq!(batch.tickers[0].link, None);
        assert_eq!(
            batch.tickers[1].link.as_deref(),
            Some("https://example.com/a")
        );
    }

    #[test]
    fn test_batch_requires_tickers_field() {
        let result = serde_json::from_str::<TickerBatch>(r#"{"items":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_ticker_without_link_omits_field() {
        let json = serde_json::to_value(Ticker::new("a", "b")).unwrap();
        assert!(json.get("link").is_none());
    }
}
