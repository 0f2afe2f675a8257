//! Fee math for charge cohorts.
//!
//! Net revenue is the charge amount in dollars minus the proportional
//! platform fee. The fee only applies to positive amounts: refunds and
//! adjustments are returned as-is.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::ChargeRecord;

/// Proportional platform fee taken from every positive charge (2.9%).
pub const FEE_RATE: Decimal = Decimal::from_parts(29, 0, 0, false, 3);

/// Net amount of a charge in dollars, unrounded.
#[must_use]
pub fn net_amount(charge: &ChargeRecord) -> Decimal {
    let dollars = Decimal::new(charge.amount_cents, 2);
    if dollars > Decimal::ZERO {
        dollars * (Decimal::ONE - FEE_RATE)
    } else {
        dollars
    }
}

/// Round to whole cents, midpoints away from zero.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount as dollars, e.g. `$9.71` or `-$5.00`.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}
