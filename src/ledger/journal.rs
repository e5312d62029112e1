//! Reads recorded card/bank transactions out of a Ledger journal.

use ledger_parser::{Ledger, LedgerItem, Posting, Transaction};
use rust_decimal::Decimal;
use tracing::debug;

use crate::comment::Comment;
use crate::ledger::LedgerTransaction;

/// Extracts one `LedgerTransaction` per journal transaction that has a
/// negative posting. `source` names the journal in generated ids.
pub fn transactions_from_ledger(ledger: &Ledger, source: &str) -> Vec<LedgerTransaction> {
    let mut result = Vec::new();
    let trns = ledger.items.iter().filter_map(|item| match item {
        LedgerItem::Transaction(trn) => Some(trn),
        _ => None,
    });
    for (ordinal, trn) in trns.enumerate() {
        match from_transaction(trn, source, ordinal + 1) {
            Some(txn) => result.push(txn),
            None => debug!(
                date = %trn.date,
                description = %trn.description,
                "skipping transaction without a negative posting"
            ),
        }
    }
    result
}

fn from_transaction(trn: &Transaction, source: &str, ordinal: usize) -> Option<LedgerTransaction> {
    let amounts = posting_amounts(trn);
    let (post, (amount, currency)) = trn
        .postings
        .iter()
        .zip(amounts)
        .find_map(|(post, amount)| match amount {
            Some((quantity, currency)) if quantity < Decimal::ZERO => {
                Some((post, (quantity, currency)))
            }
            _ => None,
        })?;

    Some(LedgerTransaction {
        id: transaction_id(trn, post).unwrap_or_else(|| format!("{}:{}", source, ordinal)),
        date: trn.date,
        payee: trn.description.trim().to_string(),
        amount,
        currency,
        account: post.account.clone(),
    })
}

/// Quantity and commodity of each posting. A single posting without an
/// amount takes the one that balances the others, provided they share a
/// commodity.
fn posting_amounts(trn: &Transaction) -> Vec<Option<(Decimal, String)>> {
    let mut amounts: Vec<Option<(Decimal, String)>> = trn
        .postings
        .iter()
        .map(|post| {
            post.amount
                .as_ref()
                .map(|pa| (pa.amount.quantity, pa.amount.commodity.name.clone()))
        })
        .collect();
    let missing: Vec<usize> = amounts
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_none())
        .map(|(i, _)| i)
        .collect();
    if let [i] = missing[..] {
        amounts[i] = balancing_amount(&amounts);
    }
    amounts
}

fn balancing_amount(amounts: &[Option<(Decimal, String)>]) -> Option<(Decimal, String)> {
    let mut known = amounts.iter().flatten();
    let (first, currency) = known.next()?;
    let mut sum = *first;
    for (quantity, other) in known {
        if other != currency {
            return None;
        }
        sum += *quantity;
    }
    Some((-sum, currency.clone()))
}

fn transaction_id(trn: &Transaction, post: &Posting) -> Option<String> {
    if let Some(fp) = Comment::from_opt_string(&post.comment).fingerprint() {
        return Some(fp);
    }
    Comment::from_opt_string(&trn.comment)
        .id()
        .map(str::to_string)
}
