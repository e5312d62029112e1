//! Renders a parsed receipt as a balanced Ledger transaction.

use chrono::NaiveDate;
use serde_derive::{Deserialize, Serialize};

use crate::money::Cents;
use crate::receipt::ParsedReceipt;
use crate::tags;

const UNKNOWN_MERCHANT: &str = "UNKNOWN_MERCHANT";
const INDENT: &str = "  ";

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Account credited with the receipt total until the card charge is
    /// matched.
    pub payment_account: String,
    pub tax_account: String,
    pub fee_account: String,
    /// Account that absorbs any unbalanced remainder.
    pub review_account: String,
    pub currency: String,
    pub narration: String,
    /// Date written for receipts whose date could not be read.
    pub placeholder_date: NaiveDate,
    /// Appends the OCR text as comment lines after the transaction.
    pub include_raw_text: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            payment_account: "Liabilities:CreditCard:PENDING".to_string(),
            tax_account: "Expenses:Tax:HST".to_string(),
            fee_account: "Expenses:Fees:Deposit".to_string(),
            review_account: "Expenses:FIXME".to_string(),
            currency: "CAD".to_string(),
            narration: "Receipt scan".to_string(),
            placeholder_date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(),
            include_raw_text: false,
        }
    }
}

struct Posting {
    account: String,
    amount: Cents,
    comment: Option<String>,
}

/// Formats `receipt` as a Ledger transaction. `receipt_id`, when given, is
/// recorded as a `receipt:` tag on the transaction.
///
/// Postings are, in order: the payment account at `-total`, one per item,
/// one per fee, one per tax and, when the receipt does not balance, one to the
/// review account carrying exactly the remainder. The postings always sum to
/// zero.
pub fn format_receipt(receipt: &ParsedReceipt, receipt_id: Option<&str>, config: &FormatConfig) -> String {
    let mut out = String::new();

    let date = match receipt.date {
        Some(date) => date,
        None => {
            out.push_str(&format!(
                "; FIXME: unknown date (placeholder used: {})\n",
                config.placeholder_date
            ));
            config.placeholder_date
        }
    };
    let merchant = receipt.merchant.as_deref().unwrap_or(UNKNOWN_MERCHANT);
    out.push_str(&format!(
        "{} * \"{}\" \"{}\"\n",
        date,
        unquote(merchant),
        unquote(&config.narration)
    ));
    if let Some(id) = receipt_id {
        out.push_str(&format!("{}; {}: {}\n", INDENT, tags::RECEIPT_KEY, id));
    }

    let mut postings = vec![Posting {
        account: config.payment_account.clone(),
        amount: -receipt.total,
        comment: None,
    }];
    let mut item_postings = Vec::with_capacity(receipt.items.len());
    for item in &receipt.items {
        item_postings.push(postings.len());
        let description = unquote(&item.description);
        let comment = match (description.is_empty(), item.quantity > 1) {
            (true, _) => None,
            (false, true) => Some(format!("{} (qty {})", description, item.quantity)),
            (false, false) => Some(description),
        };
        postings.push(Posting {
            account: item.category.clone(),
            amount: item.amount,
            comment,
        });
    }
    for (account, charges) in [(&config.fee_account, &receipt.fees), (&config.tax_account, &receipt.taxes)] {
        for charge in charges {
            postings.push(Posting {
                account: account.clone(),
                amount: charge.amount,
                comment: Some(unquote(&charge.label)).filter(|l| !l.is_empty()),
            });
        }
    }
    if !receipt.unbalanced_remainder.is_zero() {
        postings.push(Posting {
            account: config.review_account.clone(),
            amount: receipt.unbalanced_remainder,
            comment: Some("FIXME: unaccounted amount".to_string()),
        });
    }

    // Warnings go after the posting of the item they concern. Receipt-wide
    // warnings follow the last item, or the payment posting without items.
    let mut warnings_after: Vec<Vec<&str>> = vec![Vec::new(); postings.len()];
    for warning in &receipt.warnings {
        let posting_idx = match (item_postings.last(), warning.after_item) {
            (None, _) => 0,
            (Some(&last), None) => last,
            (Some(&last), Some(i)) => item_postings.get(i).copied().unwrap_or(last),
        };
        warnings_after[posting_idx].push(&warning.message);
    }

    let amounts: Vec<String> = postings
        .iter()
        .map(|p| format!("{} {}", p.amount, config.currency))
        .collect();
    let account_width = postings.iter().map(|p| p.account.len()).max().unwrap_or(0);
    let amount_width = amounts.iter().map(String::len).max().unwrap_or(0);

    for ((posting, amount), warnings) in postings.iter().zip(&amounts).zip(&warnings_after) {
        let mut line = format!(
            "{}{:<account_width$}  {:>amount_width$}",
            INDENT,
            posting.account,
            amount,
            account_width = account_width,
            amount_width = amount_width
        );
        if let Some(comment) = &posting.comment {
            line.push_str("  ; ");
            line.push_str(comment);
        }
        out.push_str(&line);
        out.push('\n');
        for message in warnings {
            out.push_str(&format!("{}; WARN:PARSER {}\n", INDENT, single_line(message)));
        }
    }

    if config.include_raw_text && !receipt.raw_text.is_empty() {
        out.push_str("; --- OCR text ---\n");
        for line in receipt.raw_text.lines() {
            out.push_str(&format!("; {}\n", line).replace("; \n", ";\n"));
        }
    }

    out
}

fn unquote(s: &str) -> String {
    s.replace('"', "'")
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
