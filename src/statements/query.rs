//! Filter and sort parameters for the income statement listing.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::IncomeStatementRecord;

/// Rejections raised while parsing parameters or applying them to records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid value '{value}' for '{param}': expected {expected}")]
    InvalidParameter {
        param: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("unknown sort field '{value}'")]
    UnknownSortField { value: String },
    #[error("invalid sort direction '{value}', expected 'asc' or 'desc'")]
    InvalidSortDirection { value: String },
    #[error("record date '{value}' does not match YYYY-MM-DD")]
    InvalidDate { value: String },
}

/// Record field used as the sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Date,
    Symbol,
    Revenue,
    NetIncome,
    GrossProfit,
    Eps,
    OperatingIncome,
}

impl SortField {
    /// Wire name, matching the serialized record field.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Date => "date",
            SortField::Symbol => "symbol",
            SortField::Revenue => "revenue",
            SortField::NetIncome => "netIncome",
            SortField::GrossProfit => "grossProfit",
            SortField::Eps => "eps",
            SortField::OperatingIncome => "operatingIncome",
        }
    }

    /// Natural ascending order of two records on this field.
    ///
    /// Dates compare as strings, which is chronological for `YYYY-MM-DD`.
    pub fn compare(&self, a: &IncomeStatementRecord, b: &IncomeStatementRecord) -> Ordering {
        match self {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Symbol => a.symbol.cmp(&b.symbol),
            SortField::Revenue => a.revenue.total_cmp(&b.revenue),
            SortField::NetIncome => a.net_income.total_cmp(&b.net_income),
            SortField::GrossProfit => a.gross_profit.total_cmp(&b.gross_profit),
            SortField::Eps => a.eps.total_cmp(&b.eps),
            SortField::OperatingIncome => a.operating_income.total_cmp(&b.operating_income),
        }
    }
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortField::Date),
            "symbol" => Ok(SortField::Symbol),
            "revenue" => Ok(SortField::Revenue),
            "netIncome" | "net_income" => Ok(SortField::NetIncome),
            "grossProfit" | "gross_profit" => Ok(SortField::GrossProfit),
            "eps" => Ok(SortField::Eps),
            "operatingIncome" | "operating_income" => Ok(SortField::OperatingIncome),
            other => Err(ValidationError::UnknownSortField {
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ValidationError::InvalidSortDirection {
                value: s.to_string(),
            }),
        }
    }
}

/// Per-request filter and sort settings. Every bound is inclusive; `None`
/// means the corresponding filter is skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSortParams {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub min_revenue: Option<f64>,
    pub max_revenue: Option<f64>,
    pub min_net_income: Option<f64>,
    pub max_net_income: Option<f64>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl FilterSortParams {
    /// Build params from raw query-string pairs.
    ///
    /// Blank values count as absent and the first non-blank value of a
    /// repeated key wins. Unrecognized keys are ignored.
    pub fn from_query(pairs: &[(String, String)]) -> Result<Self, ValidationError> {
        let sort_field = match first_value(pairs, "sort_field") {
            Some(raw) => raw.parse()?,
            None => SortField::default(),
        };
        let sort_direction = match first_value(pairs, "sort_direction") {
            Some(raw) => raw.parse()?,
            None => SortDirection::default(),
        };

        Ok(Self {
            start_year: parse_year(pairs, "start_year")?,
            end_year: parse_year(pairs, "end_year")?,
            min_revenue: parse_number(pairs, "min_revenue")?,
            max_revenue: parse_number(pairs, "max_revenue")?,
            min_net_income: parse_number(pairs, "min_net_income")?,
            max_net_income: parse_number(pairs, "max_net_income")?,
            sort_field,
            sort_direction,
        })
    }

    pub fn has_year_bounds(&self) -> bool {
        self.start_year.is_some() || self.end_year.is_some()
    }
}

fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.trim())
        .find(|v| !v.is_empty())
}

fn parse_year(pairs: &[(String, String)], param: &'static str) -> Result<Option<i32>, ValidationError> {
    first_value(pairs, param)
        .map(|raw| {
            raw.parse::<i32>()
                .map_err(|_| ValidationError::InvalidParameter {
                    param,
                    value: raw.to_string(),
                    expected: "an integer",
                })
        })
        .transpose()
}

fn parse_number(pairs: &[(String, String)], param: &'static str) -> Result<Option<f64>, ValidationError> {
    first_value(pairs, param)
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|_| ValidationError::InvalidParameter {
                    param,
                    value: raw.to_string(),
                    expected: "a number",
                })
        })
        .transpose()
}
