//! Reconciles parsed receipts with recorded card/bank transactions.
//!
//! Every receipt is scored against every transaction, then pairs are
//! committed greedily from the best score down so that no transaction is
//! given to two receipts. Receipts whose two best candidates are too close to
//! call are reported as ambiguous and left for a person to resolve.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::ledger::LedgerTransaction;
use crate::money::Cents;
use crate::receipt::ParsedReceipt;

pub mod cmd;
pub mod score;

use score::{score_pair, to_score};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct MatchConfig {
    pub amount_weight: f64,
    pub date_weight: f64,
    pub merchant_weight: f64,
    /// Amount differences up to this score fully.
    pub amount_tolerance: Cents,
    /// Amount differences at or beyond this score zero; between the
    /// tolerance and here the score falls off linearly.
    pub amount_soft_band: Cents,
    /// Date distance, in days, at which the date score reaches zero.
    pub date_window_days: i64,
    /// Pairs scoring below this are never matched.
    pub min_score: f64,
    /// A receipt whose best two candidates are closer than this is ambiguous.
    pub ambiguity_margin: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            amount_weight: 0.6,
            date_weight: 0.3,
            merchant_weight: 0.1,
            amount_tolerance: Cents(2),
            amount_soft_band: Cents(10),
            date_window_days: 5,
            min_score: 0.5,
            ambiguity_margin: 0.05,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    #[error("receipt id {0:?} given more than once")]
    DuplicateReceiptId(String),
    #[error("transaction id {0:?} given more than once")]
    DuplicateTransactionId(String),
}

/// A parsed receipt with the identifier it is reported under.
#[derive(Clone, Debug)]
pub struct ScannedReceipt {
    pub id: String,
    pub receipt: ParsedReceipt,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum MatchStatus {
    Matched,
    Ambiguous,
    Unmatched,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use MatchStatus::*;
        f.write_str(match self {
            Matched => "matched",
            Ambiguous => "ambiguous",
            Unmatched => "unmatched",
        })
    }
}

/// A transaction considered for a receipt.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Candidate {
    pub transaction_id: String,
    pub score: Decimal,
    pub amount_score: f64,
    pub date_score: f64,
    pub merchant_score: f64,
    pub date_distance: Option<i64>,
}

impl Candidate {
    /// Best first: higher score, then closer date, then earlier id.
    fn rank(&self, other: &Self) -> Ordering {
        let distance = |c: &Self| c.date_distance.unwrap_or(i64::MAX);
        other
            .score
            .cmp(&self.score)
            .then_with(|| distance(self).cmp(&distance(other)))
            .then_with(|| self.transaction_id.cmp(&other.transaction_id))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchResult {
    pub receipt_id: String,
    pub transaction_id: Option<String>,
    /// Score of the committed pair. For ambiguous receipts the best
    /// candidate's score, for unmatched ones the best score seen at all.
    pub score: Decimal,
    pub status: MatchStatus,
    /// Near-tied alternatives of an ambiguous receipt, best first.
    pub candidates: Vec<Candidate>,
}

impl MatchResult {
    fn unmatched(receipt_id: &str, scored: &[Candidate]) -> Self {
        MatchResult {
            receipt_id: receipt_id.to_string(),
            transaction_id: None,
            score: scored.first().map_or(Decimal::ZERO, |c| c.score),
            status: MatchStatus::Unmatched,
            candidates: Vec::new(),
        }
    }
}

/// Matches `receipts` with `txns`, returning one result per receipt in input
/// order.
pub fn match_receipts(
    receipts: &[ScannedReceipt],
    txns: &[LedgerTransaction],
    config: &MatchConfig,
) -> Result<Vec<MatchResult>, MatchError> {
    check_unique(receipts.iter().map(|r| r.id.as_str()))
        .map_err(MatchError::DuplicateReceiptId)?;
    check_unique(txns.iter().map(|t| t.id.as_str())).map_err(MatchError::DuplicateTransactionId)?;

    let min_score = to_score(config.min_score);
    let margin = to_score(config.ambiguity_margin);

    let scored: Vec<Vec<Candidate>> = receipts
        .par_iter()
        .map(|r| score_receipt(r, txns, config))
        .collect();

    // Ambiguous and hopeless receipts are settled before the greedy pass and
    // take no part in it.
    let mut results: Vec<Option<MatchResult>> = Vec::with_capacity(receipts.len());
    let mut pool: Vec<(usize, &Candidate)> = Vec::new();
    for (i, (receipt, cands)) in receipts.iter().zip(&scored).enumerate() {
        let above: Vec<&Candidate> = cands.iter().filter(|c| c.score >= min_score).collect();
        let result = match above.as_slice() {
            [] => Some(MatchResult::unmatched(&receipt.id, cands)),
            [best, second, ..] if best.score - second.score < margin => Some(MatchResult {
                receipt_id: receipt.id.clone(),
                transaction_id: None,
                score: best.score,
                status: MatchStatus::Ambiguous,
                candidates: above
                    .iter()
                    .filter(|c| best.score - c.score < margin)
                    .map(|c| (*c).clone())
                    .collect(),
            }),
            _ => {
                pool.extend(above.iter().map(|c| (i, *c)));
                None
            }
        };
        results.push(result);
    }

    pool.sort_by(|(ai, a), (bi, b)| {
        a.rank(b)
            .then_with(|| receipts[*ai].id.cmp(&receipts[*bi].id))
    });
    let mut consumed: HashSet<&str> = HashSet::new();
    for (i, cand) in pool {
        if results[i].is_some() || consumed.contains(cand.transaction_id.as_str()) {
            continue;
        }
        consumed.insert(&cand.transaction_id);
        debug!(
            receipt = %receipts[i].id,
            transaction = %cand.transaction_id,
            score = %cand.score,
            "matched"
        );
        results[i] = Some(MatchResult {
            receipt_id: receipts[i].id.clone(),
            transaction_id: Some(cand.transaction_id.clone()),
            score: cand.score,
            status: MatchStatus::Matched,
            candidates: Vec::new(),
        });
    }

    let results: Vec<MatchResult> = results
        .into_iter()
        .zip(receipts.iter().zip(&scored))
        .map(|(result, (receipt, cands))| {
            result.unwrap_or_else(|| MatchResult::unmatched(&receipt.id, cands))
        })
        .collect();

    let mut counts: HashMap<MatchStatus, usize> = HashMap::new();
    for r in &results {
        *counts.entry(r.status).or_default() += 1;
    }
    info!(
        receipts = receipts.len(),
        transactions = txns.len(),
        matched = counts.get(&MatchStatus::Matched).copied().unwrap_or(0),
        ambiguous = counts.get(&MatchStatus::Ambiguous).copied().unwrap_or(0),
        unmatched = counts.get(&MatchStatus::Unmatched).copied().unwrap_or(0),
        "matching complete"
    );
    Ok(results)
}

/// All candidates for one receipt, best first.
fn score_receipt(
    scanned: &ScannedReceipt,
    txns: &[LedgerTransaction],
    config: &MatchConfig,
) -> Vec<Candidate> {
    let receipt = &scanned.receipt;
    let mut cands: Vec<Candidate> = txns
        .iter()
        .map(|txn| {
            let s = score_pair(
                receipt.total,
                receipt.date,
                receipt.merchant.as_deref(),
                txn,
                config,
            );
            Candidate {
                transaction_id: txn.id.clone(),
                score: s.total,
                amount_score: s.amount,
                date_score: s.date,
                merchant_score: s.merchant,
                date_distance: s.date_distance,
            }
        })
        .collect();
    cands.sort_by(Candidate::rank);
    cands
}

fn check_unique<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), String> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(id.to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use test_case::test_case;

    use super::*;

    fn receipt(id: &str, total: i64, date: Option<(i32, u32, u32)>, merchant: &str) -> ScannedReceipt {
        ScannedReceipt {
            id: id.to_string(),
            receipt: ParsedReceipt {
                merchant: Some(merchant.to_string()),
                date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                total: Cents(total),
                items: Vec::new(),
                taxes: Vec::new(),
                fees: Vec::new(),
                subtotal: None,
                warnings: Vec::new(),
                raw_text: String::new(),
                unbalanced_remainder: Cents(total),
            },
        }
    }

    fn txn(id: &str, amount: i64, day: u32, payee: &str) -> LedgerTransaction {
        LedgerTransaction {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            payee: payee.to_string(),
            amount: Decimal::new(-amount, 2),
            currency: "CAD".to_string(),
            account: "Liabilities:Visa".to_string(),
        }
    }

    fn summary(results: &[MatchResult]) -> Vec<(String, MatchStatus, Option<String>)> {
        results
            .iter()
            .map(|r| (r.receipt_id.clone(), r.status, r.transaction_id.clone()))
            .collect()
    }

    fn entry(r: &str, status: MatchStatus, t: Option<&str>) -> (String, MatchStatus, Option<String>) {
        (r.to_string(), status, t.map(str::to_string))
    }

    #[test]
    fn exact_amount_beats_closer_date() {
        let results = match_receipts(
            &[receipt("r1", 1641, Some((2024, 1, 15)), "LOBLAW")],
            &[txn("t-near", 1645, 15, "LOBLAW"), txn("t-exact", 1641, 16, "LOBLAW")],
            &MatchConfig::default(),
        )
        .unwrap();
        assert_eq!(
            vec![entry("r1", MatchStatus::Matched, Some("t-exact"))],
            summary(&results)
        );
        assert_eq!(Decimal::new(94, 2), results[0].score);
    }

    #[test]
    fn near_tie_is_ambiguous_and_consumes_nothing() {
        let results = match_receipts(
            &[
                receipt("r1", 1000, Some((2024, 1, 10)), "COSTCO"),
                receipt("r2", 1000, Some((2024, 1, 11)), "COSTCO"),
            ],
            &[txn("t1", 1000, 11, "COSTCO"), txn("t2", 1000, 9, "COSTCO")],
            &MatchConfig::default(),
        )
        .unwrap();
        // r1 is one day from both transactions.
        assert_eq!(
            vec![
                entry("r1", MatchStatus::Ambiguous, None),
                entry("r2", MatchStatus::Matched, Some("t1")),
            ],
            summary(&results)
        );
        let ids: Vec<&str> = results[0]
            .candidates
            .iter()
            .map(|c| c.transaction_id.as_str())
            .collect();
        assert_eq!(vec!["t1", "t2"], ids);
    }

    #[test]
    fn greedy_assignment_is_bijective() {
        let results = match_receipts(
            &[
                receipt("r1", 2000, Some((2024, 1, 10)), "A"),
                receipt("r2", 2000, Some((2024, 1, 12)), "A"),
                receipt("r3", 2000, Some((2024, 1, 13)), "A"),
            ],
            &[txn("t1", 2000, 10, "A"), txn("t2", 2000, 13, "A")],
            &MatchConfig::default(),
        )
        .unwrap();
        assert_eq!(
            vec![
                entry("r1", MatchStatus::Matched, Some("t1")),
                entry("r2", MatchStatus::Unmatched, None),
                entry("r3", MatchStatus::Matched, Some("t2")),
            ],
            summary(&results)
        );
        let mut seen = HashSet::new();
        for id in results.iter().filter_map(|r| r.transaction_id.as_ref()) {
            assert!(seen.insert(id), "{} assigned twice", id);
        }
    }

    #[test_case(&[(2000, Some(10)), (2000, Some(12)), (2000, Some(13))], &[(2000, 10), (2000, 13)]; "more receipts than charges")]
    #[test_case(&[(500, Some(5)); 4], &[(500, 5), (500, 5)]; "identical receipts")]
    #[test_case(&[(500, Some(5)), (505, Some(5)), (495, Some(6))], &[(500, 6)]; "one charge near all")]
    #[test_case(&[(1000, None), (1000, None), (1000, Some(3))], &[(1000, 3), (1000, 4)]; "undated receipts")]
    #[test_case(&[(100, Some(1)), (200, Some(2)), (300, Some(3))], &[(300, 1), (200, 2), (100, 3)]; "crossed dates")]
    #[test_case(&[(100, Some(1)), (100, Some(2))], &[]; "no charges")]
    #[test_case(&[(750, Some(20)), (750, Some(21)), (750, Some(22)), (750, Some(23))], &[(750, 21), (750, 22), (750, 20)]; "shared amount over days")]
    fn assignment_is_bijective(receipts: &[(i64, Option<u32>)], txns: &[(i64, u32)]) {
        let receipts: Vec<ScannedReceipt> = receipts
            .iter()
            .enumerate()
            .map(|(i, &(total, day))| receipt(&format!("r{}", i), total, day.map(|d| (2024, 1, d)), "SHOP"))
            .collect();
        let txns: Vec<LedgerTransaction> = txns
            .iter()
            .enumerate()
            .map(|(i, &(amount, day))| txn(&format!("t{}", i), amount, day, "SHOP"))
            .collect();
        let results = match_receipts(&receipts, &txns, &MatchConfig::default()).unwrap();

        assert_eq!(receipts.len(), results.len());
        let mut seen = HashSet::new();
        for result in &results {
            let matched = result.status == MatchStatus::Matched;
            assert_eq!(matched, result.transaction_id.is_some(), "{:?}", result);
            if let Some(id) = &result.transaction_id {
                assert!(seen.insert(id.clone()), "{} assigned twice", id);
                assert!(txns.iter().any(|t| &t.id == id), "unknown {}", id);
            }
        }
        assert!(seen.len() <= txns.len());
    }

    #[test]
    fn consumed_candidate_leaves_receipt_unmatched() {
        // Both receipts want t1; r1 scores higher and takes it.
        let results = match_receipts(
            &[
                receipt("r1", 500, Some((2024, 1, 5)), "CAFE"),
                receipt("r2", 500, Some((2024, 1, 6)), "CAFE"),
            ],
            &[txn("t1", 500, 5, "CAFE")],
            &MatchConfig::default(),
        )
        .unwrap();
        assert_eq!(
            vec![
                entry("r1", MatchStatus::Matched, Some("t1")),
                entry("r2", MatchStatus::Unmatched, None),
            ],
            summary(&results)
        );
        assert_eq!(Decimal::new(94, 2), results[1].score);
    }

    #[test]
    fn equal_scores_prefer_earlier_receipt_id() {
        let results = match_receipts(
            &[
                receipt("r-b", 500, Some((2024, 1, 5)), "CAFE"),
                receipt("r-a", 500, Some((2024, 1, 5)), "CAFE"),
            ],
            &[txn("t1", 500, 5, "CAFE")],
            &MatchConfig::default(),
        )
        .unwrap();
        assert_eq!(
            vec![
                entry("r-b", MatchStatus::Unmatched, None),
                entry("r-a", MatchStatus::Matched, Some("t1")),
            ],
            summary(&results)
        );
    }

    #[test]
    fn without_date_amount_alone_can_match() {
        let results = match_receipts(
            &[receipt("r1", 1641, None, "LOBLAW")],
            &[txn("t1", 1641, 15, "LOBLAW")],
            &MatchConfig::default(),
        )
        .unwrap();
        assert_eq!(MatchStatus::Matched, results[0].status);
        assert_eq!(Decimal::new(7, 1), results[0].score);
    }

    #[test]
    fn below_threshold_is_unmatched() {
        let results = match_receipts(
            &[receipt("r1", 1641, Some((2024, 1, 15)), "LOBLAW")],
            &[txn("t1", 9999, 15, "LOBLAW")],
            &MatchConfig::default(),
        )
        .unwrap();
        assert_eq!(MatchStatus::Unmatched, results[0].status);
        assert_eq!(None, results[0].transaction_id);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let config = MatchConfig::default();
        let r = receipt("r1", 100, None, "X");
        assert_eq!(
            Err(MatchError::DuplicateReceiptId("r1".to_string())),
            match_receipts(&[r.clone(), r], &[], &config)
        );
        assert_eq!(
            Err(MatchError::DuplicateTransactionId("t1".to_string())),
            match_receipts(&[], &[txn("t1", 1, 1, "X"), txn("t1", 2, 2, "Y")], &config)
        );
    }
}
