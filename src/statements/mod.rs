//! Income statement filtering and sorting.

pub mod processor;
pub mod query;

pub use processor::{process, record_year};
pub use query::{FilterSortParams, SortDirection, SortField, ValidationError};
