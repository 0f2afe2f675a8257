//! Error types for charge cohorts.

/// Result type for configuration checks.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised eagerly, before any network activity takes place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No API credential was supplied.
    #[error("configuration error: cohort requires a billing API key")]
    MissingCredential,

    /// A window bound could not be parsed as a date.
    #[error("configuration error: {field} must be a date, got {input:?}")]
    InvalidDate {
        /// Which bound was rejected (`start` or `end`).
        field: &'static str,
        /// The raw input.
        input: String,
    },

    /// The window ends before it starts.
    #[error("configuration error: window end {end} is before start {start}")]
    InvalidWindow {
        /// Window start (RFC 3339).
        start: String,
        /// Window end (RFC 3339).
        end: String,
    },

    /// An option is out of range.
    #[error("configuration error: {0}")]
    InvalidOption(String),
}
