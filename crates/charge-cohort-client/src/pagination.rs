//! Paginated fetching of every charge in a window.
//!
//! # Strategies
//!
//! - **Offset**: one probe page at offset 0 reports the total count. The
//!   remaining pages are independent, so they are scattered over at most
//!   `concurrency` in-flight requests and gathered back in offset order.
//! - **Cursor**: each page request needs the last ID of the previous page,
//!   so pages are fetched strictly one after another until the service
//!   reports no more data or returns an empty page.
//!
//! Both strategies are all-or-nothing: the first failed page request fails
//! the fetch, and any request still in flight is dropped with it.

use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};

use charge_cohort_core::{ChargeId, ChargeRecord, ConfigError, FetchWindow};

use crate::error::TransportError;
use crate::query::{PaginationMode, QueryClient};
use crate::types::{CreatedRange, CursorPage, CursorPageRequest, OffsetPageRequest};

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default number of offset pages in flight.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Paging options for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Records per page.
    pub page_size: u32,
    /// Maximum offset pages in flight. Ignored by the cursor strategy.
    pub concurrency: usize,
    /// Forced pagination mode; the client's preferred mode when `None`.
    pub mode: Option<PaginationMode>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            mode: None,
        }
    }
}

impl PaginationConfig {
    /// Check that page size and concurrency are usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidOption` if either is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidOption(
                "page_size must be at least 1".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidOption(
                "concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// The pagination strategy a fetch runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStrategy {
    /// Probe, then scatter/gather by offset.
    Offset {
        /// Maximum pages in flight.
        concurrency: NonZeroUsize,
    },
    /// Sequential pages by cursor.
    Cursor,
}

impl PaginationStrategy {
    /// Pick the strategy from the configured mode, falling back to the
    /// client's preferred mode.
    #[must_use]
    pub fn resolve(config: &PaginationConfig, preferred: PaginationMode) -> Self {
        match config.mode.unwrap_or(preferred) {
            PaginationMode::Offset => Self::Offset {
                concurrency: NonZeroUsize::new(config.concurrency).unwrap_or(NonZeroUsize::MIN),
            },
            PaginationMode::Cursor => Self::Cursor,
        }
    }
}

/// Offsets still to fetch after the probe page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetPlan {
    /// Records per page.
    pub page_size: u32,
    /// Records returned by the probe page.
    pub first_page_len: u64,
    /// Total records reported by the probe page.
    pub total_count: u64,
}

impl OffsetPlan {
    /// Records not covered by the probe page.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.total_count.saturating_sub(self.first_page_len)
    }

    /// Number of additional pages.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.remaining().div_ceil(u64::from(self.page_size))
    }

    /// Offsets of the additional pages, ascending.
    pub fn offsets(&self) -> impl Iterator<Item = u64> {
        let Self {
            page_size,
            first_page_len,
            ..
        } = *self;
        (0..self.page_count()).map(move |i| first_page_len + i * u64::from(page_size))
    }
}

/// Cursor pagination state: `Fetching` while `has_more`, `Done` after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorState {
    /// Records per page.
    pub page_size: u32,
    /// ID of the last record seen.
    pub last_id: Option<ChargeId>,
    /// Whether another page should be requested.
    pub has_more: bool,
}

impl CursorState {
    /// State before the first page.
    #[must_use]
    pub const fn new(page_size: u32) -> Self {
        Self {
            page_size,
            last_id: None,
            has_more: true,
        }
    }

    /// Request for the next page.
    #[must_use]
    pub fn request(&self, created: CreatedRange) -> CursorPageRequest {
        CursorPageRequest {
            created,
            page_size: self.page_size,
            starting_after: self.last_id.clone(),
        }
    }

    /// Move past `page`. An empty page ends pagination even if the service
    /// claims there is more.
    pub fn advance(&mut self, page: &CursorPage) {
        match page.data.last() {
            Some(last) => {
                self.last_id = Some(last.id.clone());
                self.has_more = page.has_more;
            }
            None => self.has_more = false,
        }
    }
}

/// Fetches every charge in a window through a `QueryClient`.
#[derive(Debug)]
pub struct PaginationEngine<C: ?Sized> {
    client: Arc<C>,
    config: PaginationConfig,
}

impl<C: QueryClient + ?Sized> PaginationEngine<C> {
    /// Create an engine over `client`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidOption` if the page size or concurrency
    /// is zero.
    pub fn new(client: Arc<C>, config: PaginationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { client, config })
    }

    /// The strategy `fetch_all` will use.
    #[must_use]
    pub fn strategy(&self) -> PaginationStrategy {
        PaginationStrategy::resolve(&self.config, self.client.preferred_mode())
    }

    /// Fetch every charge created within `window`, in page order.
    ///
    /// # Errors
    ///
    /// Returns the first `TransportError` raised by a page request. No
    /// records are returned on failure.
    #[instrument(skip_all, fields(window = %window, page_size = self.config.page_size))]
    pub async fn fetch_all(&self, window: &FetchWindow) -> Result<Vec<ChargeRecord>, TransportError> {
        let created = CreatedRange::from(window);
        let charges = match self.strategy() {
            PaginationStrategy::Offset { concurrency } => {
                self.fetch_by_offset(created, concurrency).await?
            }
            PaginationStrategy::Cursor => self.fetch_by_cursor(created).await?,
        };

        info!(count = charges.len(), "Finished loading all charges in window");
        Ok(charges)
    }

    async fn fetch_by_offset(
        &self,
        created: CreatedRange,
        concurrency: NonZeroUsize,
    ) -> Result<Vec<ChargeRecord>, TransportError> {
        let page_size = self.config.page_size;
        let probe = self
            .client
            .list_by_offset(&OffsetPageRequest {
                created,
                page_size,
                offset: 0,
            })
            .await?;
        let total_count = probe
            .total_count
            .ok_or(TransportError::MissingTotalCount { offset: 0 })?;

        let mut charges = probe.data;
        let plan = OffsetPlan {
            page_size,
            first_page_len: charges.len() as u64,
            total_count,
        };
        if plan.page_count() == 0 {
            debug!(count = charges.len(), "Loaded every charge in the first page");
            return Ok(charges);
        }

        debug!(
            loaded = plan.first_page_len,
            left = plan.remaining(),
            pages = plan.page_count(),
            concurrency = concurrency.get(),
            "Paginating remaining charges by offset"
        );

        let client = &self.client;
        let mut pages: Vec<(usize, Vec<ChargeRecord>)> = stream::iter(plan.offsets().enumerate())
            .map(|(index, offset)| async move {
                let request = OffsetPageRequest {
                    created,
                    page_size,
                    offset,
                };
                let page = client.list_by_offset(&request).await?;
                debug!(offset, count = page.data.len(), "Loaded charges page");
                Ok::<_, TransportError>((index, page.data))
            })
            .buffer_unordered(concurrency.get())
            .try_collect()
            .await?;

        pages.sort_unstable_by_key(|(index, _)| *index);
        charges.extend(pages.into_iter().flat_map(|(_, data)| data));
        Ok(charges)
    }

    async fn fetch_by_cursor(&self, created: CreatedRange) -> Result<Vec<ChargeRecord>, TransportError> {
        let mut state = CursorState::new(self.config.page_size);
        let mut charges = Vec::new();

        while state.has_more {
            let page = self.client.list_by_cursor(&state.request(created)).await?;
            debug!(
                starting_after = ?state.last_id,
                count = page.data.len(),
                has_more = page.has_more,
                "Loaded charges page"
            );
            state.advance(&page);
            charges.extend(page.data);
        }

        Ok(charges)
    }
}
