use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::config::CorsPolicy;
use crate::middleware::{cors_middleware, request_logging};
use crate::models::IncomeStatementRecord;
use crate::scrapers::{FetchError, StatementSource};
use crate::statements::{self, FilterSortParams, ValidationError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn StatementSource>,
}

/// Create the API router
pub fn create_router(source: Arc<dyn StatementSource>, cors: CorsPolicy) -> Router {
    let state = AppState { source };

    Router::new()
        .route("/api/income-statements", get(get_income_statements))
        .route("/api/test", get(api_test))
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging))
                .layer(middleware::from_fn_with_state(
                    Arc::new(cors),
                    cors_middleware,
                )),
        )
}

// ===== Route Handlers =====

/// GET /api/income-statements
///
/// Parameters are validated before the upstream call, so a bad query never
/// costs an outbound request.
async fn get_income_statements(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<IncomeStatementRecord>>, ApiError> {
    let params = FilterSortParams::from_query(&pairs)?;
    let records = state.source.fetch().await?;
    let fetched = records.len();
    let records = statements::process(records, &params)?;

    debug!(
        fetched,
        returned = records.len(),
        sort_field = params.sort_field.as_str(),
        sort_direction = params.sort_direction.as_str(),
        "Income statements filtered"
    );

    Ok(Json(records))
}

/// GET /api/test
async fn api_test(uri: Uri) -> Json<TestResponse> {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    Json(TestResponse {
        message: "API is working!".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        path,
    })
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

// ===== Request/Response Types =====

#[derive(Debug, Serialize)]
struct TestResponse {
    message: String,
    timestamp: String,
    path: String,
}

// ===== Error Handling =====

#[derive(Debug)]
pub enum ApiError {
    Fetch(FetchError),
    Validation(ValidationError),
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError::Fetch(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message for the `error` field.
    pub fn message(&self) -> String {
        match self {
            ApiError::Fetch(err @ FetchError::MissingApiKey) => err.to_string(),
            ApiError::Fetch(FetchError::Decode(_)) => {
                "Invalid JSON response from FMP API".to_string()
            }
            ApiError::Fetch(err) => format!("Failed to fetch data from FMP API: {}", err),
            ApiError::Validation(err) => format!("Error processing data: {}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Fetch(err) => {
                error!(
                    error = %err,
                    upstream_status = ?err.upstream_status(),
                    "Income statement fetch failed"
                );
            }
            ApiError::Validation(err) => debug!(error = %err, "Rejected income statement query"),
        }

        let body = Json(json!({
            "error": self.message(),
        }));

        (self.status(), body).into_response()
    }
}
