//! Income Statements Backend Library
//!
//! Fetches annual income statements from Financial Modeling Prep, filters and
//! sorts them per request, and serves the result over HTTP.

pub mod api;
pub mod config;
pub mod middleware;
pub mod models;
pub mod scrapers;
pub mod statements;
