//! Client error types.

use std::time::Duration;

use charge_cohort_core::ConfigError;

/// Errors raised while talking to the billing service.
///
/// Any of these is fatal to the fetch that hit it.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The billing service returned an error response.
    #[error("API error ({status}): {error_type} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error type.
        error_type: String,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An offset page came back without the total count the offset
    /// strategy relies on.
    #[error("offset page at {offset} is missing total_count")]
    MissingTotalCount {
        /// Offset of the page.
        offset: u64,
    },
}

/// Errors returned by the cohort entry point.
#[derive(Debug, thiserror::Error)]
pub enum CohortError {
    /// Invalid credential, options or window. Raised before any request.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// A page request failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The fetch did not finish before the deadline.
    #[error("cohort fetch timed out after {0:?}")]
    Timeout(Duration),
}
