//! Upstream data clients.

pub mod fmp;

use async_trait::async_trait;

use crate::models::IncomeStatementRecord;

pub use fmp::{FetchError, FmpClient};

/// Anything that can produce the raw income statement list for one request.
#[async_trait]
pub trait StatementSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<IncomeStatementRecord>, FetchError>;
}
