//! Builds a `ParsedReceipt` from classified lines and checks that it
//! balances.

use serde_derive::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::categories::CategoryRules;
use crate::money::Cents;
use crate::receipt::classify::{ClassifiedLines, LineRole, NoiseReason};
use crate::receipt::{Charge, LineItem, ParsedReceipt, ReceiptError, ReceiptWarning};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Largest remainder, in cents, that is recorded without a warning.
    pub balance_tolerance: Cents,
    /// Items read with a lower confidence carry a warning.
    pub min_item_confidence: f64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: Cents(3),
            min_item_confidence: 0.6,
        }
    }
}

pub fn assemble(
    lines: &ClassifiedLines,
    categories: &CategoryRules,
    config: &AssemblyConfig,
) -> Result<ParsedReceipt, ReceiptError> {
    let (_, total) = lines.total().ok_or(ReceiptError::MissingTotal)?;

    let mut merchant = None;
    let mut date = None;
    let mut subtotal = None;
    let mut items: Vec<LineItem> = Vec::new();
    let mut taxes = Vec::new();
    let mut fees = Vec::new();
    let mut warnings = Vec::new();

    for cl in lines.iter() {
        let last_item = items.len().checked_sub(1);
        match &cl.role {
            LineRole::Merchant(name) => {
                merchant.get_or_insert_with(|| name.clone());
            }
            LineRole::Date(d) => {
                date.get_or_insert(*d);
            }
            LineRole::Item {
                description,
                amount,
                quantity,
            } => {
                items.push(LineItem {
                    description: description.clone(),
                    amount: *amount,
                    category: categories.categorize(description).to_string(),
                    confidence: cl.confidence,
                    quantity: *quantity,
                });
                if cl.confidence < config.min_item_confidence {
                    warnings.push(ReceiptWarning {
                        message: format!(
                            "low OCR confidence {:.2} for item {:?}",
                            cl.confidence, cl.line.text
                        ),
                        after_item: Some(items.len() - 1),
                    });
                }
            }
            LineRole::Tax { label, amount } => taxes.push(Charge {
                label: label.clone(),
                amount: *amount,
                confidence: cl.confidence,
            }),
            LineRole::DepositFee { label, amount } => fees.push(Charge {
                label: label.clone(),
                amount: *amount,
                confidence: cl.confidence,
            }),
            LineRole::Subtotal(amount) => subtotal = Some(*amount),
            LineRole::Total(_) => {}
            LineRole::Noise(NoiseReason::UnparsableAmount(err)) => {
                warn!(line = %cl.line.text, "unparsable amount: {}", err);
                warnings.push(ReceiptWarning {
                    message: format!("could not read line {:?}: {}", cl.line.text, err),
                    after_item: last_item,
                });
            }
            LineRole::Noise(_) => {}
        }
    }

    let raw_text = lines
        .iter()
        .map(|cl| cl.line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut receipt = ParsedReceipt {
        merchant,
        date,
        total,
        items,
        taxes,
        fees,
        subtotal,
        warnings,
        raw_text,
        unbalanced_remainder: Cents::ZERO,
    };
    receipt.unbalanced_remainder = total - receipt.charges_sum();

    if receipt.unbalanced_remainder.abs() > config.balance_tolerance {
        warn!(
            merchant = ?receipt.merchant,
            total = %total,
            remainder = %receipt.unbalanced_remainder,
            "receipt does not balance"
        );
        receipt.warnings.push(ReceiptWarning {
            message: format!(
                "items, taxes and fees sum to {} but total is {} (remainder {})",
                receipt.charges_sum(),
                total,
                receipt.unbalanced_remainder
            ),
            after_item: None,
        });
    }

    debug!(
        items = receipt.items.len(),
        taxes = receipt.taxes.len(),
        fees = receipt.fees.len(),
        remainder = %receipt.unbalanced_remainder,
        "assembled receipt"
    );
    Ok(receipt)
}
