#[cfg(feature = "test-adapters")]
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use quotelog_core::QuotelogError;

/// Public Yahoo Finance query host.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

pub(crate) const SOURCE_NAME: &str = "quotelog-yahoo";

/// Chart endpoint abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait YahooChart: Send + Sync {
    /// Fetch the `chart.result[0].meta` object for `symbol`.
    async fn meta(&self, symbol: &str) -> Result<Map<String, Value>, QuotelogError>;
}

/// Real adapter backed by a single `reqwest::Client`.
/// `reqwest::Client` is `Clone + Send + Sync`, so no external locking is needed.
#[derive(Clone)]
pub struct RealAdapter {
    http: reqwest::Client,
    base_url: String,
}

impl RealAdapter {
    /// Build a client with a browser user agent pointed at [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    /// Returns `Source` if the HTTP client cannot be constructed.
    pub fn try_new_default() -> Result<Self, QuotelogError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| QuotelogError::source(SOURCE_NAME, e.to_string()))?;
        Ok(Self::new(http, DEFAULT_BASE_URL))
    }

    /// Wrap an existing client and base URL (no trailing slash required).
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn map_status(status: reqwest::StatusCode, context: &str) -> QuotelogError {
    match status.as_u16() {
        404 => QuotelogError::not_found(context.to_string()),
        429 => QuotelogError::source(SOURCE_NAME, format!("rate limit: {context}")),
        s if status.is_server_error() => {
            QuotelogError::source(SOURCE_NAME, format!("server error {s}: {context}"))
        }
        s => QuotelogError::source(SOURCE_NAME, format!("status {s}: {context}")),
    }
}

/// Extract `chart.result[0].meta` from a chart response body.
pub(crate) fn parse_chart_body(
    body: &str,
    context: &str,
) -> Result<Map<String, Value>, QuotelogError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| QuotelogError::Data(format!("undecodable {context}: {e}")))?;
    let chart = root
        .get("chart")
        .ok_or_else(|| QuotelogError::Data(format!("{context}: missing chart")))?;

    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let code = err.get("code").and_then(Value::as_str).unwrap_or_default();
        let desc = err
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if code.eq_ignore_ascii_case("not found") {
            return Err(QuotelogError::not_found(context.to_string()));
        }
        return Err(QuotelogError::source(
            SOURCE_NAME,
            format!("{code}: {desc} ({context})"),
        ));
    }

    chart
        .get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .and_then(|r| r.get("meta"))
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| QuotelogError::Data(format!("{context}: empty result")))
}

#[async_trait]
impl YahooChart for RealAdapter {
    async fn meta(&self, symbol: &str) -> Result<Map<String, Value>, QuotelogError> {
        let context = format!("chart for {symbol}");
        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("interval", "1d"), ("range", "1d")])
            .send()
            .await
            .map_err(|e| QuotelogError::source(SOURCE_NAME, format!("{context}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(map_status(status, &context));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| QuotelogError::source(SOURCE_NAME, format!("{context}: {e}")))?;
        parse_chart_body(&body, &context)
    }
}

/* -------- Test-only lightweight adapter constructors ------- */

#[cfg(feature = "test-adapters")]
impl dyn YahooChart {
    /// Build a `YahooChart` from a closure (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn YahooChart>
    where
        F: Send + Sync + 'static + Fn(String) -> Result<Map<String, Value>, QuotelogError>,
    {
        struct FnChart<F>(F);
        #[async_trait]
        impl<F> YahooChart for FnChart<F>
        where
            F: Send + Sync + 'static + Fn(String) -> Result<Map<String, Value>, QuotelogError>,
        {
            async fn meta(&self, symbol: &str) -> Result<Map<String, Value>, QuotelogError> {
                (self.0)(symbol.to_string())
            }
        }
        Arc::new(FnChart(f))
    }
}
