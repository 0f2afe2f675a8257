//! Core types and utilities for charge cohorts.
//!
//! This crate provides the foundational pieces used by the cohort client:
//!
//! - **Identifiers**: `ChargeId`, `CustomerId`
//! - **Charges**: `ChargeRecord`, `Customer`
//! - **Windows**: `FetchWindow`, `DateBound`
//! - **Fees**: `net_amount`, `round_cents`, `format_usd`
//! - **Collections**: `ChargeCollection`
//!
//! # Money
//!
//! Charge amounts arrive as signed integer cents. Net revenue is computed in
//! exact decimal dollars and only rounded to cents when aggregated:
//!
//! - A $10.00 charge nets `10 * (1 - 0.029) = 9.71`
//! - A -$5.00 refund nets `-5.00` (fees are never taken back from refunds)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod charge;
pub mod collection;
pub mod error;
pub mod fees;
pub mod ids;
pub mod window;

pub use charge::{ChargeRecord, Customer};
pub use collection::ChargeCollection;
pub use error::{ConfigError, Result};
pub use fees::{format_usd, net_amount, round_cents, FEE_RATE};
pub use ids::{ChargeId, CustomerId, IdError};
pub use window::{parse_date, DateBound, FetchWindow};
