//! The page query seam.
//!
//! A `QueryClient` issues exactly one page request against the billing
//! service. Paging, ordering and failure policy live in the
//! `PaginationEngine`; implementations only translate a request into a call.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::types::{CursorPage, CursorPageRequest, OffsetPage, OffsetPageRequest};

/// Which pagination metadata a billing API supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    /// Numeric offset plus a total count.
    Offset,
    /// Last-seen ID plus a has-more flag.
    Cursor,
}

impl PaginationMode {
    /// Get the mode name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Offset => "offset",
            Self::Cursor => "cursor",
        }
    }
}

impl fmt::Display for PaginationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaginationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offset" => Ok(Self::Offset),
            "cursor" => Ok(Self::Cursor),
            other => Err(format!("unknown pagination mode: {other}")),
        }
    }
}

/// Issues single page requests against the billing service.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// The pagination mode to use when none is configured.
    fn preferred_mode(&self) -> PaginationMode;

    /// Fetch one page by offset.
    async fn list_by_offset(
        &self,
        request: &OffsetPageRequest,
    ) -> Result<OffsetPage, TransportError>;

    /// Fetch one page after a cursor.
    async fn list_by_cursor(
        &self,
        request: &CursorPageRequest,
    ) -> Result<CursorPage, TransportError>;
}
