//! Range filters followed by a single stable sort.

use chrono::{Datelike, NaiveDate};

use super::query::{FilterSortParams, SortDirection, ValidationError};
use crate::models::IncomeStatementRecord;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filter `records` by every bound present in `params`, then sort them.
///
/// Predicates run in a fixed order per record (year, revenue, net income) and a
/// record is dropped at the first one it fails. A record whose date cannot be
/// parsed fails the whole call, but only while a year bound is active.
pub fn process(
    records: Vec<IncomeStatementRecord>,
    params: &FilterSortParams,
) -> Result<Vec<IncomeStatementRecord>, ValidationError> {
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if passes_filters(&record, params)? {
            kept.push(record);
        }
    }

    let field = params.sort_field;
    // slice::sort_by is stable; reversing the comparator keeps ties in input order.
    match params.sort_direction {
        SortDirection::Asc => kept.sort_by(|a, b| field.compare(a, b)),
        SortDirection::Desc => kept.sort_by(|a, b| field.compare(b, a)),
    }

    Ok(kept)
}

fn passes_filters(
    record: &IncomeStatementRecord,
    params: &FilterSortParams,
) -> Result<bool, ValidationError> {
    if params.has_year_bounds() {
        let year = record_year(record)?;
        if params.start_year.is_some_and(|start| year < start) {
            return Ok(false);
        }
        if params.end_year.is_some_and(|end| year > end) {
            return Ok(false);
        }
    }

    let within = |value: f64, min: Option<f64>, max: Option<f64>| {
        min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
    };

    Ok(within(record.revenue, params.min_revenue, params.max_revenue)
        && within(record.net_income, params.min_net_income, params.max_net_income))
}

/// Calendar year of the record's `date`.
pub fn record_year(record: &IncomeStatementRecord) -> Result<i32, ValidationError> {
    NaiveDate::parse_from_str(&record.date, DATE_FORMAT)
        .map(|d| d.year())
        .map_err(|_| ValidationError::InvalidDate {
            value: record.date.clone(),
        })
}
