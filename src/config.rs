//! Service configuration
//!
//! Values are resolved once at startup (CLI / env / `.env`) and handed to the
//! components that need them. Nothing below reads the environment itself.

use std::path::{Path, PathBuf};

pub const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com";

/// Tracing directives used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str =
    "statements_backend=debug,statements_server=debug,tower_http=debug";

/// `.env` files tried after the working-directory search, later ones
/// filling in whatever the earlier ones left unset.
pub fn dotenv_candidates(crate_dir: &Path) -> [PathBuf; 2] {
    [
        crate_dir.join(".env"),
        crate_dir.parent().unwrap_or(crate_dir).join(".env"),
    ]
}

/// Financial Modeling Prep connection settings.
#[derive(Debug, Clone)]
pub struct FmpConfig {
    /// `None` means every fetch fails with a config error.
    pub api_key: Option<String>,
    /// Scheme and host, no trailing slash.
    pub base_url: String,
}

impl FmpConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_FMP_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for FmpConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Which origins get an `Access-Control-Allow-Origin` header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorsPolicy {
    /// `Access-Control-Allow-Origin: *`
    #[default]
    Any,
    /// Echo the request origin only when it is listed.
    AllowList(Vec<String>),
}

impl CorsPolicy {
    /// Parse a comma-separated origin list. Empty input means [`CorsPolicy::Any`].
    pub fn from_list(raw: Option<&str>) -> Self {
        let origins: Vec<String> = raw
            .unwrap_or_default()
            .split(',')
            .map(|o| o.trim().trim_end_matches('/'))
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            CorsPolicy::Any
        } else {
            CorsPolicy::AllowList(origins)
        }
    }

    pub fn allows(&self, origin: &str) -> bool {
        match self {
            CorsPolicy::Any => true,
            CorsPolicy::AllowList(origins) => origins.iter().any(|o| o == origin),
        }
    }
}
