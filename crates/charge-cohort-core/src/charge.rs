//! Charge types for charge cohorts.
//!
//! A `ChargeRecord` is one financial transaction as reported by the billing
//! service. Records are read-only once they enter a cohort: collections hold
//! them behind `Arc` and only ever hand out shared references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ChargeId, CustomerId};

/// Currency assumed when the billing service omits one.
pub const DEFAULT_CURRENCY: &str = "usd";

/// One charge (or refund/adjustment) from the billing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRecord {
    /// Remote-assigned charge ID.
    pub id: ChargeId,

    /// Amount in cents. Positive for charges, zero or negative for
    /// refunds and adjustments.
    pub amount_cents: i64,

    /// Whether the charge was paid.
    pub paid: bool,

    /// Whether the charge was refunded.
    pub refunded: bool,

    /// When the charge was created (second resolution).
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,

    /// Three-letter ISO currency code, lowercase.
    pub currency: String,

    /// The customer that was charged.
    pub customer: Customer,
}

impl ChargeRecord {
    /// Create a paid, unrefunded charge with no customer details.
    #[must_use]
    pub fn new(id: ChargeId, amount_cents: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            amount_cents,
            paid: true,
            refunded: false,
            created_at,
            currency: DEFAULT_CURRENCY.to_string(),
            customer: Customer::default(),
        }
    }

    /// Set the paid flag.
    #[must_use]
    pub fn with_paid(mut self, paid: bool) -> Self {
        self.paid = paid;
        self
    }

    /// Set the refunded flag.
    #[must_use]
    pub fn with_refunded(mut self, refunded: bool) -> Self {
        self.refunded = refunded;
        self
    }

    /// Set the customer.
    #[must_use]
    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customer = customer;
        self
    }

    /// Creation time as epoch seconds.
    #[must_use]
    pub fn created_epoch(&self) -> i64 {
        self.created_at.timestamp()
    }
}

/// The customer a charge belongs to.
///
/// The billing service only returns customer details when the customer is
/// expanded on the charge; otherwise just the ID (or nothing) is known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Remote customer ID, if the charge has a customer.
    #[serde(default)]
    pub id: Option<CustomerId>,

    /// Customer email, if known.
    #[serde(default)]
    pub email: Option<String>,
}

impl Customer {
    /// Create a customer with only an email.
    #[must_use]
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: Some(email.into()),
        }
    }

    /// Email for display, `unknown` when missing.
    #[must_use]
    pub fn display_email(&self) -> &str {
        self.email.as_deref().unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_charge_defaults() {
        let created = DateTime::from_timestamp(1_391_212_800, 0).unwrap();
        let charge = ChargeRecord::new(ChargeId::new("ch_1").unwrap(), 1000, created);

        assert!(charge.paid);
        assert!(!charge.refunded);
        assert_eq!(charge.currency, "usd");
        assert_eq!(charge.created_epoch(), 1_391_212_800);
        assert_eq!(charge.customer.display_email(), "unknown");
    }

    #[test]
    fn charge_serde_uses_epoch_seconds() {
        let created = DateTime::from_timestamp(1_391_212_800, 0).unwrap();
        let charge = ChargeRecord::new(ChargeId::new("ch_1").unwrap(), 250, created)
            .with_customer(Customer::with_email("a@example.com"));

        let json = serde_json::to_value(&charge).unwrap();
        assert_eq!(json["created_at"], 1_391_212_800);

        let parsed: ChargeRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, charge);
    }
}
