use serde::{Deserialize, Serialize};

/// One annual income statement as returned by the upstream API.
///
/// Upstream rows carry many more columns (`calendarYear`, `cik`, ...); they are
/// dropped on decode so the response only ever exposes these seven fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatementRecord {
    /// Fiscal period end, `YYYY-MM-DD`.
    pub date: String,
    pub symbol: String,
    pub revenue: f64,
    pub net_income: f64,
    pub gross_profit: f64,
    pub eps: f64,
    pub operating_income: f64,
}

impl IncomeStatementRecord {
    pub fn new(date: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            symbol: symbol.into(),
            revenue: 0.0,
            net_income: 0.0,
            gross_profit: 0.0,
            eps: 0.0,
            operating_income: 0.0,
        }
    }

    pub fn with_revenue(mut self, revenue: f64) -> Self {
        self.revenue = revenue;
        self
    }

    pub fn with_net_income(mut self, net_income: f64) -> Self {
        self.net_income = net_income;
        self
    }

    pub fn with_gross_profit(mut self, gross_profit: f64) -> Self {
        self.gross_profit = gross_profit;
        self
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_operating_income(mut self, operating_income: f64) -> Self {
        self.operating_income = operating_income;
        self
    }
}
