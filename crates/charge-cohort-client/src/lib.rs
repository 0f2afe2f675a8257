//! Charge cohort client.
//!
//! This crate fetches every charge created within a date window from the
//! billing service, following pagination transparently, and hands the result
//! back as an immutable [`ChargeCollection`].
//!
//! # Example
//!
//! ```no_run
//! use charge_cohort_client::{ChargeCohort, CohortOptions, DateBound};
//! use chrono::{TimeZone, Utc};
//!
//! # async fn example() -> Result<(), charge_cohort_client::CohortError> {
//! let cohort = ChargeCohort::new("sk_test_...", CohortOptions::new().with_concurrency(4))?;
//!
//! let start = Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2014, 3, 1, 0, 0, 0).unwrap();
//! let charges = cohort.cohort(start, end).await?;
//!
//! let paid = charges.paid(true).refunded(false);
//! println!("{} paid charges, net {}", paid.len(), paid.total(start, end));
//!
//! let mid = Utc.with_ymd_and_hms(2014, 2, 15, 0, 0, 0).unwrap();
//! println!("first half: {}", paid.count(start, mid));
//! println!("everything: {}", paid.count(DateBound::UNSET, DateBound::UNSET));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cohort;
mod config;
mod error;
mod pagination;
mod query;
mod stripe;
mod types;

pub use cohort::ChargeCohort;
pub use config::{CohortConfig, CohortOptions, DEFAULT_BASE_URL, SECRET_PATHS};
pub use error::{CohortError, TransportError};
pub use pagination::{
    CursorState, OffsetPlan, PaginationConfig, PaginationEngine, PaginationStrategy,
    DEFAULT_CONCURRENCY, DEFAULT_PAGE_SIZE,
};
pub use query::{PaginationMode, QueryClient};
pub use stripe::StripeQueryClient;
pub use types::*;

pub use charge_cohort_core::{
    ChargeCollection, ChargeId, ChargeRecord, ConfigError, Customer, CustomerId, DateBound,
    FetchWindow,
};
