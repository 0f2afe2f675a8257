//! Request and response types for page queries.
//!
//! The first half of this module is the page contract every `QueryClient`
//! speaks. The second half is the JSON returned by the Stripe charges
//! endpoint and its conversion into `ChargeRecord`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use charge_cohort_core::{ChargeId, ChargeRecord, Customer, CustomerId, FetchWindow};

// ============================================================================
// Page contract
// ============================================================================

/// Inclusive creation-time filter in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRange {
    /// Lower bound (`created >= gte`).
    pub gte: i64,
    /// Upper bound (`created <= lte`), absent when unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<i64>,
}

impl From<&FetchWindow> for CreatedRange {
    fn from(window: &FetchWindow) -> Self {
        let (gte, lte) = window.bounds();
        Self { gte, lte }
    }
}

/// Request for one page by numeric offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetPageRequest {
    /// Creation-time filter.
    pub created: CreatedRange,
    /// Maximum records per page.
    pub page_size: u32,
    /// Number of records to skip.
    pub offset: u64,
}

/// Request for one page after a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPageRequest {
    /// Creation-time filter.
    pub created: CreatedRange,
    /// Maximum records per page.
    pub page_size: u32,
    /// ID of the last record of the previous page.
    pub starting_after: Option<ChargeId>,
}

/// One page fetched by offset.
#[derive(Debug, Clone, Default)]
pub struct OffsetPage {
    /// Records in API order.
    pub data: Vec<ChargeRecord>,
    /// Total matching records across all pages.
    pub total_count: Option<u64>,
}

/// One page fetched by cursor.
#[derive(Debug, Clone, Default)]
pub struct CursorPage {
    /// Records in API order.
    pub data: Vec<ChargeRecord>,
    /// Whether more records follow this page.
    pub has_more: bool,
}

// ============================================================================
// Stripe wire format
// ============================================================================

/// Stripe list response for charges.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeList {
    /// Object type (always "list").
    #[serde(default)]
    pub object: String,
    /// Charges on this page.
    pub data: Vec<StripeCharge>,
    /// Whether there are more items.
    #[serde(default)]
    pub has_more: bool,
    /// Total matching charges, present when requested with
    /// `include[]=total_count`.
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl From<ChargeList> for OffsetPage {
    fn from(list: ChargeList) -> Self {
        Self {
            data: list.data.into_iter().map(ChargeRecord::from).collect(),
            total_count: list.total_count,
        }
    }
}

impl From<ChargeList> for CursorPage {
    fn from(list: ChargeList) -> Self {
        Self {
            data: list.data.into_iter().map(ChargeRecord::from).collect(),
            has_more: list.has_more,
        }
    }
}

/// Stripe charge object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCharge {
    /// Charge ID.
    pub id: ChargeId,
    /// Amount in cents.
    pub amount: i64,
    /// Whether the charge was paid.
    #[serde(default)]
    pub paid: bool,
    /// Whether the charge was refunded.
    #[serde(default)]
    pub refunded: bool,
    /// Created timestamp (Unix).
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
    /// Currency (e.g., "usd").
    #[serde(default)]
    pub currency: Option<String>,
    /// Customer, either an ID or the expanded object.
    #[serde(default)]
    pub customer: Option<ExpandableCustomer>,
    /// Email the receipt was sent to.
    #[serde(default)]
    pub receipt_email: Option<String>,
}

/// A customer field that is an ID unless expanded.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExpandableCustomer {
    /// Expanded customer object.
    Object(StripeCustomer),
    /// Bare customer ID.
    Id(CustomerId),
}

/// Stripe customer object, as expanded on a charge.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomer {
    /// Customer ID.
    pub id: CustomerId,
    /// Customer email.
    #[serde(default)]
    pub email: Option<String>,
}

impl From<StripeCharge> for ChargeRecord {
    fn from(charge: StripeCharge) -> Self {
        let customer = match charge.customer {
            Some(ExpandableCustomer::Object(customer)) => Customer {
                id: Some(customer.id),
                email: customer.email.or(charge.receipt_email),
            },
            Some(ExpandableCustomer::Id(id)) => Customer {
                id: Some(id),
                email: charge.receipt_email,
            },
            None => Customer {
                id: None,
                email: charge.receipt_email,
            },
        };

        let mut record = Self::new(charge.id, charge.amount, charge.created)
            .with_paid(charge.paid)
            .with_refunded(charge.refunded)
            .with_customer(customer);
        if let Some(currency) = charge.currency {
            record.currency = currency;
        }
        record
    }
}

/// Stripe API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    /// Error details.
    pub error: StripeErrorDetail,
}

/// Stripe error detail.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorDetail {
    /// Error type.
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message.
    #[serde(default)]
    pub message: String,
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expanded_customer_email() {
        let list: ChargeList = serde_json::from_value(json!({
            "object": "list",
            "has_more": false,
            "total_count": 1,
            "data": [{
                "id": "ch_1",
                "amount": 1000,
                "paid": true,
                "refunded": false,
                "created": 1_391_212_800,
                "currency": "usd",
                "customer": { "id": "cus_1", "email": "a@example.com" }
            }]
        }))
        .unwrap();

        let page = OffsetPage::from(list);
        assert_eq!(page.total_count, Some(1));
        let charge = &page.data[0];
        assert_eq!(charge.id.as_str(), "ch_1");
        assert_eq!(charge.customer.email.as_deref(), Some("a@example.com"));
        assert_eq!(charge.created_epoch(), 1_391_212_800);
    }

    #[test]
    fn bare_customer_id_falls_back_to_receipt_email() {
        let charge: StripeCharge = serde_json::from_value(json!({
            "id": "ch_2",
            "amount": -500,
            "refunded": true,
            "created": 1_391_212_801,
            "customer": "cus_2",
            "receipt_email": "b@example.com"
        }))
        .unwrap();

        let record = ChargeRecord::from(charge);
        assert!(!record.paid);
        assert!(record.refunded);
        assert_eq!(record.customer.id.as_ref().map(CustomerId::as_str), Some("cus_2"));
        assert_eq!(record.customer.display_email(), "b@example.com");
        assert_eq!(record.currency, "usd");
    }

    #[test]
    fn created_range_from_window() {
        let window = FetchWindow::parse("2014-02-01", "2014-03-01").unwrap();
        let range = CreatedRange::from(&window);
        assert_eq!(range.gte, 1_391_212_800);
        assert_eq!(range.lte, Some(1_393_632_000));

        let open = CreatedRange::from(&FetchWindow::since(window.start()));
        assert_eq!(serde_json::to_value(open).unwrap(), json!({ "gte": 1_391_212_800 }));
    }
}
