//! Common test utilities for charge cohort integration tests.

#![allow(dead_code)] // Some utilities are used by different test files
#![allow(clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use charge_cohort_client::{
    ChargeId, ChargeRecord, CursorPage, CursorPageRequest, OffsetPage, OffsetPageRequest,
    PaginationMode, QueryClient, TransportError,
};

/// Start of the February 2014 test window.
#[must_use]
pub fn window_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap()
}

/// End of the February 2014 test window.
#[must_use]
pub fn window_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 3, 1, 0, 0, 0).unwrap()
}

/// `count` charges one minute apart with IDs `ch_0000`, `ch_0001`, ...
#[must_use]
pub fn charges(count: usize) -> Vec<ChargeRecord> {
    (0..count)
        .map(|i| {
            ChargeRecord::new(
                ChargeId::new(format!("ch_{i:04}")).unwrap(),
                1000,
                window_start() + chrono::Duration::minutes(i64::try_from(i).unwrap()),
            )
        })
        .collect()
}

/// IDs of `records`, in order.
#[must_use]
pub fn ids(records: &[ChargeRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.to_string()).collect()
}

/// In-memory billing service that serves a fixed data set page by page.
///
/// Offset pages can be delayed or made to fail per offset, and the client
/// records every request plus the peak number of requests in flight.
#[derive(Debug)]
pub struct ScriptedClient {
    mode: PaginationMode,
    data: Vec<ChargeRecord>,
    total_count: Option<u64>,
    delays: HashMap<u64, Duration>,
    failures: HashSet<u64>,
    cursor_delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    offsets: Mutex<Vec<u64>>,
    cursors: Mutex<Vec<Option<String>>>,
}

impl ScriptedClient {
    /// Serve `data` with an accurate total count.
    #[must_use]
    pub fn new(mode: PaginationMode, data: Vec<ChargeRecord>) -> Self {
        let total_count = u64::try_from(data.len()).ok();
        Self {
            mode,
            data,
            total_count,
            delays: HashMap::new(),
            failures: HashSet::new(),
            cursor_delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            offsets: Mutex::new(Vec::new()),
            cursors: Mutex::new(Vec::new()),
        }
    }

    /// Override the reported total count.
    #[must_use]
    pub fn with_total_count(mut self, total_count: Option<u64>) -> Self {
        self.total_count = total_count;
        self
    }

    /// Delay the page at `offset`.
    #[must_use]
    pub fn with_delay(mut self, offset: u64, delay: Duration) -> Self {
        self.delays.insert(offset, delay);
        self
    }

    /// Delay every cursor page.
    #[must_use]
    pub fn with_cursor_delay(mut self, delay: Duration) -> Self {
        self.cursor_delay = delay;
        self
    }

    /// Fail the page at `offset`.
    #[must_use]
    pub fn with_failure(mut self, offset: u64) -> Self {
        self.failures.insert(offset);
        self
    }

    /// Offsets requested so far, in request order.
    #[must_use]
    pub fn requested_offsets(&self) -> Vec<u64> {
        self.offsets.lock().unwrap().clone()
    }

    /// Cursors requested so far, in request order.
    #[must_use]
    pub fn requested_cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }

    /// Peak number of concurrent requests.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(&self.in_flight)
    }

    fn slice(&self, start: usize, page_size: u32) -> Vec<ChargeRecord> {
        let start = start.min(self.data.len());
        let end = start
            .saturating_add(usize::try_from(page_size).unwrap_or(usize::MAX))
            .min(self.data.len());
        self.data[start..end].to_vec()
    }
}

/// Decrements the in-flight counter when a request finishes or is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn server_error(offset: u64) -> TransportError {
    TransportError::Api {
        status: 500,
        error_type: "api_error".to_string(),
        message: format!("page at offset {offset} failed"),
        code: None,
    }
}

#[async_trait]
impl QueryClient for ScriptedClient {
    fn preferred_mode(&self) -> PaginationMode {
        self.mode
    }

    async fn list_by_offset(
        &self,
        request: &OffsetPageRequest,
    ) -> Result<OffsetPage, TransportError> {
        let _guard = self.enter();
        self.offsets.lock().unwrap().push(request.offset);

        if let Some(delay) = self.delays.get(&request.offset) {
            tokio::time::sleep(*delay).await;
        }
        if self.failures.contains(&request.offset) {
            return Err(server_error(request.offset));
        }

        let start = usize::try_from(request.offset).unwrap();
        Ok(OffsetPage {
            data: self.slice(start, request.page_size),
            total_count: self.total_count,
        })
    }

    async fn list_by_cursor(
        &self,
        request: &CursorPageRequest,
    ) -> Result<CursorPage, TransportError> {
        let _guard = self.enter();
        self.cursors
            .lock()
            .unwrap()
            .push(request.starting_after.as_ref().map(ToString::to_string));

        if !self.cursor_delay.is_zero() {
            tokio::time::sleep(self.cursor_delay).await;
        }

        let start = match &request.starting_after {
            Some(last) => self
                .data
                .iter()
                .position(|r| &r.id == last)
                .map_or(self.data.len(), |i| i + 1),
            None => 0,
        };
        let data = self.slice(start, request.page_size);
        let has_more = start + data.len() < self.data.len();
        Ok(CursorPage { data, has_more })
    }
}

/// Cursor client that claims more data while returning empty pages.
pub struct EmptyPageClient {
    pub calls: AtomicUsize,
}

#[async_trait]
impl QueryClient for EmptyPageClient {
    fn preferred_mode(&self) -> PaginationMode {
        PaginationMode::Cursor
    }

    async fn list_by_offset(
        &self,
        _request: &OffsetPageRequest,
    ) -> Result<OffsetPage, TransportError> {
        Ok(OffsetPage::default())
    }

    async fn list_by_cursor(
        &self,
        _request: &CursorPageRequest,
    ) -> Result<CursorPage, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CursorPage {
            data: Vec::new(),
            has_more: true,
        })
    }
}

/// Shared handle used by tests that inspect the client after a fetch.
#[must_use]
pub fn shared(client: ScriptedClient) -> Arc<ScriptedClient> {
    Arc::new(client)
}
