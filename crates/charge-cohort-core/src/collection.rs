//! The immutable charge collection.
//!
//! A `ChargeCollection` keeps charges in the order the billing service
//! returned them. Every filter builds a new backing sequence; the receiver is
//! never modified. Records themselves are shared behind `Arc`, so filtering
//! copies pointers, not charges.

use std::io::{self, Write};
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::fees::{format_usd, net_amount, round_cents};
use crate::{ChargeId, ChargeRecord, DateBound};

/// An ordered, immutable set of charges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChargeCollection {
    charges: Vec<Arc<ChargeRecord>>,
}

impl ChargeCollection {
    /// Wrap fetched charges, keeping their order.
    #[must_use]
    pub fn new(charges: Vec<ChargeRecord>) -> Self {
        charges.into_iter().collect()
    }

    /// Number of charges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.charges.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.charges.is_empty()
    }

    /// Iterate over the charges in order.
    pub fn iter(&self) -> impl Iterator<Item = &ChargeRecord> + '_ {
        self.charges.iter().map(|charge| &**charge)
    }

    /// Charge IDs in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&ChargeId> {
        self.iter().map(|charge| &charge.id).collect()
    }

    /// Keep the charges matching `predicate`, preserving order.
    #[must_use]
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&ChargeRecord) -> bool,
    {
        Self {
            charges: self
                .charges
                .iter()
                .filter(|charge| predicate(charge))
                .cloned()
                .collect(),
        }
    }

    /// Keep the charges whose paid flag equals `paid`. The flag is always
    /// explicit: pass `true` for the usual "paid only" view.
    #[must_use]
    pub fn paid(&self, paid: bool) -> Self {
        self.filter(|charge| charge.paid == paid)
    }

    /// Keep the charges whose refunded flag equals `refunded`. The flag is
    /// always explicit, like [`ChargeCollection::paid`].
    #[must_use]
    pub fn refunded(&self, refunded: bool) -> Self {
        self.filter(|charge| charge.refunded == refunded)
    }

    /// Keep the charges created within `[start, end]`, inclusive, compared in
    /// epoch seconds.
    ///
    /// An unset `start` leaves the collection unfiltered, whatever `end` is.
    /// An unset `end` has no upper limit.
    #[must_use]
    pub fn created_between(&self, start: impl Into<DateBound>, end: impl Into<DateBound>) -> Self {
        let Some(start) = start.into().epoch_seconds() else {
            return self.clone();
        };
        let end = end.into().epoch_seconds().unwrap_or(i64::MAX);

        self.filter(|charge| (start..=end).contains(&charge.created_epoch()))
    }

    /// Charges created within `[start, end]`, in order.
    #[must_use]
    pub fn list(
        &self,
        start: impl Into<DateBound>,
        end: impl Into<DateBound>,
    ) -> Vec<Arc<ChargeRecord>> {
        self.created_between(start, end).charges
    }

    /// Number of charges created within `[start, end]`.
    #[must_use]
    pub fn count(&self, start: impl Into<DateBound>, end: impl Into<DateBound>) -> usize {
        self.created_between(start, end).len()
    }

    /// Net revenue of the charges created within `[start, end]`, rounded once
    /// to cents.
    #[must_use]
    pub fn total(&self, start: impl Into<DateBound>, end: impl Into<DateBound>) -> Decimal {
        let sum: Decimal = self
            .created_between(start, end)
            .iter()
            .map(net_amount)
            .sum();
        round_cents(sum)
    }

    /// Write an audit of every charge to `sink`: one `email - amount` line per
    /// charge, then the total.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by `sink`.
    pub fn print<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        for charge in self.iter() {
            writeln!(
                sink,
                "{} - {}",
                charge.customer.display_email(),
                format_usd(net_amount(charge))
            )?;
        }
        let total = self.total(DateBound::UNSET, DateBound::UNSET);
        writeln!(sink, "Total Charges: {}", format_usd(total))?;

        tracing::debug!(charges = self.len(), total = %total, "Printed charge audit");
        Ok(())
    }
}

impl FromIterator<ChargeRecord> for ChargeCollection {
    fn from_iter<I: IntoIterator<Item = ChargeRecord>>(iter: I) -> Self {
        Self {
            charges: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl From<Vec<ChargeRecord>> for ChargeCollection {
    fn from(charges: Vec<ChargeRecord>) -> Self {
        Self::new(charges)
    }
}

impl<'a> IntoIterator for &'a ChargeCollection {
    type Item = &'a ChargeRecord;
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, Arc<ChargeRecord>>,
        fn(&'a Arc<ChargeRecord>) -> &'a ChargeRecord,
    >;

    fn into_iter(self) -> Self::IntoIter {
        let deref: fn(&'a Arc<ChargeRecord>) -> &'a ChargeRecord = |charge| &**charge;
        self.charges.iter().map(deref)
    }
}
