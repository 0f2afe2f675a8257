//! Cohort configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use charge_cohort_core::ConfigError;

use crate::pagination::{PaginationConfig, DEFAULT_CONCURRENCY, DEFAULT_PAGE_SIZE};
use crate::query::PaginationMode;

/// Default Stripe API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.stripe.com/v1";

/// Secrets files checked, in order, for the Stripe API key.
pub const SECRET_PATHS: [&str; 3] = [
    ".secrets/stripe.json",
    "charge-cohort/.secrets/stripe.json",
    "../.secrets/stripe.json",
];

/// Options for a cohort fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortOptions {
    /// Records per page (default: 100).
    pub page_size: u32,

    /// Maximum offset pages in flight (default: 1).
    pub concurrency: usize,

    /// Forced pagination mode (default: the client's preferred mode).
    pub mode: Option<PaginationMode>,

    /// Per-request HTTP timeout in seconds (default: 30).
    pub request_timeout_seconds: u64,

    /// Deadline for the whole fetch (default: none).
    pub deadline: Option<Duration>,

    /// Billing API base URL.
    pub base_url: String,
}

impl Default for CohortOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            mode: None,
            request_timeout_seconds: 30,
            deadline: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl CohortOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the offset concurrency.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Force a pagination mode.
    #[must_use]
    pub fn with_mode(mut self, mode: PaginationMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set a deadline for the whole fetch.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Paging options for the engine.
    #[must_use]
    pub fn pagination(&self) -> PaginationConfig {
        PaginationConfig {
            page_size: self.page_size,
            concurrency: self.concurrency,
            mode: self.mode,
        }
    }

    /// Check the options before any request is made.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidOption` for a zero page size, concurrency
    /// or request timeout, or an empty base URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pagination().validate()?;
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidOption(
                "request_timeout_seconds must be at least 1".into(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidOption("base_url must not be empty".into()));
        }
        Ok(())
    }
}

/// Credential and options resolved from the environment.
#[derive(Debug, Clone, Default)]
pub struct CohortConfig {
    /// Stripe secret API key, if found.
    pub api_key: Option<String>,

    /// Fetch options.
    pub options: CohortOptions,
}

/// Stripe secrets file structure.
#[derive(Debug, Deserialize)]
struct StripeSecrets {
    api_key: String,
}

impl CohortConfig {
    /// Load configuration from secrets files and environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::load(&SECRET_PATHS, |key| std::env::var(key).ok())
    }

    /// Load configuration from the given secrets files and variable lookup.
    ///
    /// The API key comes from the first readable secrets file, then
    /// `STRIPE_API_KEY`. Unparseable numeric overrides fall back to defaults.
    pub fn load<P, F>(secret_paths: &[P], env: F) -> Self
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CohortOptions::default();
        let options = CohortOptions {
            page_size: parse_var(&env, "COHORT_PAGE_SIZE").unwrap_or(defaults.page_size),
            concurrency: parse_var(&env, "COHORT_CONCURRENCY").unwrap_or(defaults.concurrency),
            mode: parse_var(&env, "COHORT_MODE"),
            request_timeout_seconds: parse_var(&env, "COHORT_REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
            deadline: parse_var(&env, "COHORT_DEADLINE_SECONDS").map(Duration::from_secs),
            base_url: env("STRIPE_API_BASE").unwrap_or(defaults.base_url),
        };

        Self {
            api_key: load_api_key(secret_paths, &env),
            options,
        }
    }
}

fn parse_var<T: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    env(key).and_then(|value| value.trim().parse().ok())
}

/// Load the Stripe API key from file or environment.
fn load_api_key<P: AsRef<Path>>(
    secret_paths: &[P],
    env: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    for path in secret_paths {
        let path = path.as_ref();
        if let Ok(secrets) = load_secrets_file::<StripeSecrets>(path) {
            tracing::info!(path = %path.display(), "Loaded Stripe secrets from file");
            return Some(secrets.api_key);
        }
    }

    tracing::debug!("Stripe secrets file not found, using environment variables");
    env("STRIPE_API_KEY").filter(|key| !key.trim().is_empty())
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, std::io::Error> {
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
