//! Pairwise receipt/transaction scoring.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::ledger::LedgerTransaction;
use crate::matching::MatchConfig;
use crate::money::Cents;

/// Tokens dropped before comparing merchant names.
const MERCHANT_NOISE: &[&str] = &["INC", "LLC", "LTD", "CORP", "CO", "THE"];

/// Score of one receipt against one transaction, with its parts.
#[derive(Clone, Debug, PartialEq)]
pub struct PairScore {
    pub amount: f64,
    pub date: f64,
    pub merchant: f64,
    /// Weighted sum of the parts, rounded to four places.
    pub total: Decimal,
    /// Days between receipt and transaction; `None` without a receipt date.
    pub date_distance: Option<i64>,
}

pub fn score_pair(
    total: Cents,
    date: Option<NaiveDate>,
    merchant: Option<&str>,
    txn: &LedgerTransaction,
    config: &MatchConfig,
) -> PairScore {
    let amount = amount_score(total, txn, config);
    let date_distance = date.map(|d| (txn.date - d).num_days().abs());
    let date = date_score(date_distance, config.date_window_days);
    let merchant = merchant.map_or(0.0, |m| merchant_score(m, &txn.payee));
    let weighted = config.amount_weight * amount
        + config.date_weight * date
        + config.merchant_weight * merchant;
    PairScore {
        amount,
        date,
        merchant,
        total: to_score(weighted),
        date_distance,
    }
}

pub fn to_score(value: f64) -> Decimal {
    Decimal::from_f64(value.clamp(0.0, 1.0))
        .unwrap_or_default()
        .round_dp(4)
        .normalize()
}

fn amount_score(total: Cents, txn: &LedgerTransaction, config: &MatchConfig) -> f64 {
    let charged = match Cents::from_decimal(txn.amount.abs()) {
        Some(c) => c,
        None => return 0.0,
    };
    let diff = match total.0.checked_sub(charged.0).and_then(i64::checked_abs) {
        Some(diff) => diff,
        None => return 0.0,
    };
    let tolerance = config.amount_tolerance.0;
    let band_end = config.amount_soft_band.0;
    if diff <= tolerance {
        1.0
    } else if diff >= band_end || band_end <= tolerance {
        0.0
    } else {
        1.0 - (diff - tolerance) as f64 / (band_end - tolerance) as f64
    }
}

fn date_score(distance: Option<i64>, window_days: i64) -> f64 {
    match distance {
        Some(d) if d < window_days => 1.0 - d as f64 / window_days as f64,
        _ => 0.0,
    }
}

/// Jaccard similarity of the normalized word sets of two merchant names.
pub fn merchant_score(a: &str, b: &str) -> f64 {
    let (a, b) = (merchant_tokens(a), merchant_tokens(b));
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = a.intersection(&b).count();
    let all = a.union(&b).count();
    common as f64 / all as f64
}

/// Uppercase alphanumeric words, without store numbers or legal suffixes.
fn merchant_tokens(s: &str) -> BTreeSet<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !w.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_uppercase)
        .filter(|w| !MERCHANT_NOISE.contains(&w.as_str()))
        .collect()
}
