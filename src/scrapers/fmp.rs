//! Financial Modeling Prep REST client
//!
//! One call only: annual income statements for the fixed ticker. Every call
//! hits the network; there is no cache and no retry.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::StatementSource;
use crate::config::FmpConfig;
use crate::models::IncomeStatementRecord;

pub const SYMBOL: &str = "AAPL";
const PERIOD: &str = "annual";
const MAX_LOGGED_BODY: usize = 256;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API key not configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("upstream returned HTTP {status}")]
    Upstream { status: u16, body: String },
    #[error("upstream error: {0}")]
    UpstreamMessage(String),
    #[error("invalid JSON response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl FetchError {
    /// Status code reported by the upstream, when it answered with a non-2xx.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            FetchError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    // Request URLs carry the api key in the query string.
    fn request(err: reqwest::Error) -> Self {
        FetchError::Request(err.without_url())
    }
}

/// FMP answers some failures (bad key, plan limits) with a 200 and an object
/// instead of the usual list.
#[derive(Deserialize)]
#[serde(untagged)]
enum StatementsPayload {
    Statements(Vec<IncomeStatementRecord>),
    Error {
        #[serde(rename = "Error Message")]
        message: String,
    },
}

pub fn decode_statements(body: &[u8]) -> Result<Vec<IncomeStatementRecord>, FetchError> {
    match serde_json::from_slice::<StatementsPayload>(body) {
        Ok(StatementsPayload::Statements(records)) => Ok(records),
        Ok(StatementsPayload::Error { message }) => Err(FetchError::UpstreamMessage(message)),
        Err(e) => Err(FetchError::Decode(e)),
    }
}

#[derive(Clone)]
pub struct FmpClient {
    client: Client,
    config: FmpConfig,
}

impl FmpClient {
    pub fn new(config: FmpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("statements-backend/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build FmpClient")?;

        Ok(Self { client, config })
    }

    #[inline]
    fn url(&self) -> String {
        format!(
            "{}/api/v3/income-statement/{}",
            self.config.base_url, SYMBOL
        )
    }

    pub async fn get_income_statements(&self) -> Result<Vec<IncomeStatementRecord>, FetchError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(FetchError::MissingApiKey)?;

        let url = self.url();
        debug!(url = %url, period = PERIOD, "GET income statements");

        let resp = self
            .client
            .get(&url)
            .query(&[("period", PERIOD), ("apikey", api_key)])
            .send()
            .await
            .map_err(FetchError::request)?;

        let status = resp.status();
        if !status.is_success() {
            let mut body = resp.text().await.unwrap_or_default();
            body.truncate(
                body.char_indices()
                    .nth(MAX_LOGGED_BODY)
                    .map_or(body.len(), |(i, _)| i),
            );
            warn!(status = status.as_u16(), body = %body, "FMP returned non-success status");
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(FetchError::request)?;
        let records = decode_statements(&bytes)?;

        info!(symbol = SYMBOL, count = records.len(), "Fetched income statements");
        Ok(records)
    }
}

#[async_trait]
impl StatementSource for FmpClient {
    async fn fetch(&self) -> Result<Vec<IncomeStatementRecord>, FetchError> {
        self.get_income_statements().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
        routing::get,
        Router,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::net::TcpListener;

    const STATEMENTS: &str = r#"[
        {"date": "2023-09-30", "symbol": "AAPL", "calendarYear": "2023", "revenue": 383285000000,
         "netIncome": 96995000000, "grossProfit": 169148000000, "eps": 6.16, "operatingIncome": 114301000000},
        {"date": "2022-09-24", "symbol": "AAPL", "calendarYear": "2022", "revenue": 394328000000,
         "netIncome": 99803000000, "grossProfit": 170782000000, "eps": 6.15, "operatingIncome": 119437000000}
    ]"#;

    #[derive(Clone)]
    struct Upstream {
        status: StatusCode,
        body: &'static str,
        hits: Arc<AtomicUsize>,
    }

    async fn income_statement(
        State(upstream): State<Upstream>,
        Query(params): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        upstream.hits.fetch_add(1, Ordering::SeqCst);
        if params.get("period").map(String::as_str) != Some("annual")
            || params.get("apikey").map(String::as_str) != Some("test-key")
        {
            return (StatusCode::UNPROCESSABLE_ENTITY, "bad query").into_response();
        }
        (upstream.status, upstream.body).into_response()
    }

    async fn spawn_upstream(status: StatusCode, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/api/v3/income-statement/AAPL", get(income_statement))
            .with_state(Upstream {
                status,
                body,
                hits: hits.clone(),
            });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), hits)
    }

    fn client(base_url: &str, api_key: Option<&str>) -> FmpClient {
        let config = FmpConfig::new(api_key.map(str::to_string)).with_base_url(base_url);
        FmpClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_decodes_records() {
        let (base_url, hits) = spawn_upstream(StatusCode::OK, STATEMENTS).await;
        let records = client(&base_url, Some("test-key")).fetch().await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, "2023-09-30");
        assert_eq!(records[1].revenue, 394_328_000_000.0);
    }

    #[tokio::test]
    async fn test_every_fetch_hits_upstream() {
        let (base_url, hits) = spawn_upstream(StatusCode::OK, STATEMENTS).await;
        let fmp = client(&base_url, Some("test-key"));
        fmp.fetch().await.unwrap();
        fmp.fetch().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        let (base_url, hits) = spawn_upstream(StatusCode::OK, STATEMENTS).await;
        let err = client(&base_url, None).fetch().await.unwrap_err();

        assert!(matches!(err, FetchError::MissingApiKey));
        assert_eq!(err.to_string(), "API key not configured");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let (base_url, _) =
            spawn_upstream(StatusCode::SERVICE_UNAVAILABLE, r#"{"message":"down"}"#).await;
        let err = client(&base_url, Some("test-key")).fetch().await.unwrap_err();

        assert_eq!(err.upstream_status(), Some(503));
        match err {
            FetchError::Upstream { body, .. } => assert!(body.contains("down")),
            other => panic!("Expected Upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let (base_url, _) = spawn_upstream(StatusCode::OK, "<html>maintenance</html>").await;
        let err = client(&base_url, Some("test-key")).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}", addr), Some("test-key"))
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
        assert!(!err.to_string().contains("test-key"));
    }

    #[test]
    fn test_error_message_payload() {
        let body = br#"{"Error Message": "Invalid API KEY. Please retry or visit our documentation."}"#;
        match decode_statements(body) {
            Err(FetchError::UpstreamMessage(msg)) => assert!(msg.starts_with("Invalid API KEY")),
            other => panic!("Expected UpstreamMessage, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        assert!(matches!(
            decode_statements(br#"{"unexpected": true}"#),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(
            decode_statements(br#"[{"date": "2023-09-30"}]"#),
            Err(FetchError::Decode(_))
        ));
        assert!(decode_statements(b"[]").unwrap().is_empty());
    }
}
