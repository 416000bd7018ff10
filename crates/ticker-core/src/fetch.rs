//! Ticker fetching.
//!
//! A [`TickerSource`] produces one batch per call. [`HttpFetcher`] is the
//! production source: a single unauthenticated GET without query parameters
//! that expects `{"tickers": [...]}`. No timeout and no retry are applied.

use std::fmt;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use reqwest::header::{ACCEPT, USER_AGENT};

use crate::model::TickerBatch;

/// User-Agent sent with every fetch.
pub const TICKER_USER_AGENT: &str = concat!("ticker/", env!("CARGO_PKG_VERSION"));

/// Categories of fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The request could not be sent or the body could not be read.
    Request,
    /// The endpoint answered with a non-success status.
    HttpStatus,
    /// The body is not a ticker batch.
    Parse,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::Request => write!(f, "request"),
            FetchErrorKind::HttpStatus => write!(f, "http_status"),
            FetchErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured fetch error.
#[derive(Debug, Clone)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    /// One-line summary.
    pub message: String,
    /// Optional extra context such as the response body.
    pub details: Option<String>,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn request(err: &reqwest::Error) -> Self {
        Self::new(FetchErrorKind::Request, format!("Request failed: {err}"))
    }

    pub fn http_status(status: u16, body: &str) -> Self {
        Self {
            kind: FetchErrorKind::HttpStatus,
            message: format!("HTTP {status}"),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    pub fn parse(err: &serde_json::Error) -> Self {
        Self::new(
            FetchErrorKind::Parse,
            format!("Malformed ticker response: {err}"),
        )
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Something that can produce a batch of tickers for a URL.
pub trait TickerSource: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FetchResult<TickerBatch>>;
}

/// HTTP source backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetches one batch from `url`.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status, or a body
    /// that is not `{"tickers": [...]}`.
    pub async fn fetch_batch(&self, url: &str) -> FetchResult<TickerBatch> {
        tracing::debug!(url, "fetching tickers");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, TICKER_USER_AGENT)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::request(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FetchError::request(&e))?;
        if !status.is_success() {
            return Err(FetchError::http_status(status.as_u16(), &body));
        }

        let batch: TickerBatch = serde_json::from_str(&body).map_err(|e| {
            let mut err = FetchError::parse(&e);
            err.details = Some(body.clone());
            err
        })?;
        tracing::debug!(url, count = batch.tickers.len(), "fetched tickers");
        Ok(batch)
    }
}

impl TickerSource for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FetchResult<TickerBatch>> {
        self.fetch_batch(url).boxed()
    }
}
