//! Ledger-side data: rendering receipts as journal text and reading recorded
//! card/bank transactions for matching.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_derive::Serialize;

pub mod format;
pub mod journal;

/// A recorded card or bank transaction that a receipt may be matched with.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LedgerTransaction {
    /// Opaque identifier, stable across re-reads of the same journal.
    pub id: String,
    pub date: NaiveDate,
    pub payee: String,
    /// Signed amount of the charge posting (negative for a card charge).
    pub amount: Decimal,
    pub currency: String,
    pub account: String,
}
