//! The cohort entry point.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use charge_cohort_core::{ChargeCollection, FetchWindow};

use crate::config::CohortOptions;
use crate::error::CohortError;
use crate::pagination::PaginationEngine;
use crate::query::QueryClient;
use crate::stripe::StripeQueryClient;

/// Builds charge cohorts: every charge created in a window, as an immutable
/// `ChargeCollection`.
#[derive(Debug)]
pub struct ChargeCohort<C: ?Sized = StripeQueryClient> {
    engine: PaginationEngine<C>,
    options: CohortOptions,
}

impl ChargeCohort<StripeQueryClient> {
    /// Create a cohort builder backed by the Stripe API.
    ///
    /// # Errors
    ///
    /// Returns `CohortError::Configuration` if the key is missing or the
    /// options are invalid. No request is made.
    pub fn new(api_key: impl Into<String>, options: CohortOptions) -> Result<Self, CohortError> {
        options.validate()?;
        let client = StripeQueryClient::new(api_key, &options)?;
        Self::with_client(Arc::new(client), options)
    }
}

impl<C: QueryClient + ?Sized> ChargeCohort<C> {
    /// Create a cohort builder over any query client.
    ///
    /// # Errors
    ///
    /// Returns `CohortError::Configuration` if the options are invalid.
    pub fn with_client(client: Arc<C>, options: CohortOptions) -> Result<Self, CohortError> {
        options.validate()?;
        Ok(Self {
            engine: PaginationEngine::new(client, options.pagination())?,
            options,
        })
    }

    /// The options this builder was created with.
    #[must_use]
    pub fn options(&self) -> &CohortOptions {
        &self.options
    }

    /// Fetch every charge created between `start` and `end`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns `CohortError::Configuration` if `end` is before `start`,
    /// `CohortError::Transport` if any page request fails, and
    /// `CohortError::Timeout` if a deadline is configured and passes. No
    /// partial collection is ever returned.
    pub async fn cohort(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ChargeCollection, CohortError> {
        let window = FetchWindow::new(start, Some(end))?;
        self.cohort_window(&window).await
    }

    /// Fetch every charge created within `window`.
    ///
    /// # Errors
    ///
    /// See [`ChargeCohort::cohort`].
    #[instrument(skip_all, fields(window = %window))]
    pub async fn cohort_window(&self, window: &FetchWindow) -> Result<ChargeCollection, CohortError> {
        debug!("Creating charges cohort");

        let charges = match self.options.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.engine.fetch_all(window))
                .await
                .map_err(|_| CohortError::Timeout(deadline))??,
            None => self.engine.fetch_all(window).await?,
        };

        debug!(count = charges.len(), "Created charges cohort");
        Ok(ChargeCollection::new(charges))
    }
}
