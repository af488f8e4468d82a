//! Computation breakdown.
//!
//! A [`Breakdown`] is the ordered audit trail of one computation: every
//! intermediate figure a calculator produces is appended as a
//! [`BreakdownRow`].  Rows are never removed, reordered or edited;
//! insertion order is display order.  A [`TaxResult`] pairs the ledger
//! with the final tax figure and is what every calculator returns.

use crate::error::TaxError;
use crate::money::Money;
use serde::Serialize;

/// How a row's value should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// No meaningful value; the label is the content.
    #[default]
    Text,
    Currency,
    /// A rate fraction (500 = 5%).
    Percent,
}

/// Presentation role of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowVariant {
    Section,
    #[default]
    Normal,
    Subtotal,
    Total,
    Spacer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    pub label: String,
    pub value: Money,
    pub kind: ValueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub variant: RowVariant,
}

/// Append-only ledger of breakdown rows.
///
/// Growth goes through [`Vec::try_reserve`], so running out of memory is
/// reported as [`TaxError::Allocation`] rather than aborting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Breakdown {
    rows: Vec<BreakdownRow>,
}

impl Breakdown {
    pub const INITIAL_CAPACITY: usize = 64;

    pub fn new() -> Result<Self, TaxError> {
        let mut rows = Vec::new();
        rows.try_reserve(Self::INITIAL_CAPACITY)?;
        Ok(Breakdown { rows })
    }

    fn push(
        &mut self,
        label: impl Into<String>,
        value: Money,
        kind: ValueKind,
        note: Option<String>,
        variant: RowVariant,
    ) -> Result<(), TaxError> {
        if self.rows.len() == self.rows.capacity() {
            // Doubling keeps the growth geometric.
            self.rows.try_reserve(self.rows.capacity().max(1))?;
        }
        self.rows.push(BreakdownRow {
            label: label.into(),
            value,
            kind,
            note,
            variant,
        });
        Ok(())
    }

    pub fn add_section(&mut self, label: impl Into<String>) -> Result<(), TaxError> {
        self.push(label, Money::ZERO, ValueKind::Text, None, RowVariant::Section)
    }

    pub fn add_currency(
        &mut self,
        label: impl Into<String>,
        value: Money,
        note: Option<String>,
    ) -> Result<(), TaxError> {
        self.push(label, value, ValueKind::Currency, note, RowVariant::Normal)
    }

    pub fn add_percent(
        &mut self,
        label: impl Into<String>,
        rate: Money,
        note: Option<String>,
    ) -> Result<(), TaxError> {
        self.push(label, rate, ValueKind::Percent, note, RowVariant::Normal)
    }

    pub fn add_subtotal(&mut self, label: impl Into<String>, value: Money) -> Result<(), TaxError> {
        self.push(label, value, ValueKind::Currency, None, RowVariant::Subtotal)
    }

    pub fn add_total(&mut self, label: impl Into<String>, value: Money) -> Result<(), TaxError> {
        self.push(label, value, ValueKind::Currency, None, RowVariant::Total)
    }

    pub fn add_spacer(&mut self) -> Result<(), TaxError> {
        self.push("", Money::ZERO, ValueKind::Text, None, RowVariant::Spacer)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.rows.capacity()
    }

    pub fn get(&self, index: usize) -> Option<&BreakdownRow> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BreakdownRow> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[BreakdownRow] {
        &self.rows
    }
}

impl<'a> IntoIterator for &'a Breakdown {
    type Item = &'a BreakdownRow;
    type IntoIter = std::slice::Iter<'a, BreakdownRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Outcome of one computation: the tax due and how it was reached.
///
/// The index accessors mirror what a binding reads row by row; they
/// return defaults instead of failing when the index is out of range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxResult {
    total_tax: Money,
    breakdown: Breakdown,
}

impl TaxResult {
    /// An empty result with zero tax.
    pub fn new() -> Result<Self, TaxError> {
        Ok(TaxResult {
            total_tax: Money::ZERO,
            breakdown: Breakdown::new()?,
        })
    }

    pub fn total_tax(&self) -> Money {
        self.total_tax
    }

    pub(crate) fn set_total_tax(&mut self, total: Money) {
        self.total_tax = total;
    }

    pub fn breakdown(&self) -> &Breakdown {
        &self.breakdown
    }

    pub(crate) fn breakdown_mut(&mut self) -> &mut Breakdown {
        &mut self.breakdown
    }

    pub fn row_count(&self) -> usize {
        self.breakdown.len()
    }

    pub fn row(&self, index: usize) -> Option<&BreakdownRow> {
        self.breakdown.get(index)
    }

    pub fn label(&self, index: usize) -> &str {
        self.row(index).map_or("", |row| row.label.as_str())
    }

    pub fn value(&self, index: usize) -> Money {
        self.row(index).map_or(Money::ZERO, |row| row.value)
    }

    pub fn kind(&self, index: usize) -> ValueKind {
        self.row(index).map_or_else(ValueKind::default, |row| row.kind)
    }

    pub fn variant(&self, index: usize) -> RowVariant {
        self.row(index).map_or_else(RowVariant::default, |row| row.variant)
    }

    pub fn note(&self, index: usize) -> Option<&str> {
        self.row(index).and_then(|row| row.note.as_deref())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn row_count_matches_appends(n in 0usize..300) {
            let mut ledger = Breakdown::new().unwrap();
            for _ in 0..n {
                ledger.add_spacer().unwrap();
            }
            prop_assert_eq!(ledger.len(), n);
        }
    }
}
