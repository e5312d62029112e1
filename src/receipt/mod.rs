//! Turns OCR boxes into a structured, balanced receipt.

use chrono::NaiveDate;
use serde_derive::Serialize;
use thiserror::Error;

use crate::categories::CategoryRules;
use crate::config::Config;
use crate::money::Cents;
use crate::ocr::cluster::{cluster_lines, ClusterConfig};
use crate::ocr::{OcrBox, OcrError};

pub mod amount;
pub mod assemble;
pub mod classify;
pub mod cmd;
pub mod date;
pub mod text;

use assemble::AssemblyConfig;
use classify::Classifier;

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("receipt has no total line")]
    MissingTotal,
    #[error(transparent)]
    Ocr(#[from] OcrError),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineItem {
    pub description: String,
    pub amount: Cents,
    pub category: String,
    pub confidence: f64,
    pub quantity: u32,
}

/// A tax or deposit/fee line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Charge {
    pub label: String,
    pub amount: Cents,
    pub confidence: f64,
}

/// Something a reviewer should look at. `after_item` anchors the warning
/// after an item (by index into `items`); `None` concerns the whole receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReceiptWarning {
    pub message: String,
    pub after_item: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParsedReceipt {
    pub merchant: Option<String>,
    pub date: Option<NaiveDate>,
    pub total: Cents,
    pub items: Vec<LineItem>,
    pub taxes: Vec<Charge>,
    pub fees: Vec<Charge>,
    pub subtotal: Option<Cents>,
    pub warnings: Vec<ReceiptWarning>,
    pub raw_text: String,
    /// `total - (items + taxes + fees)`.
    pub unbalanced_remainder: Cents,
}

impl ParsedReceipt {
    pub fn charges_sum(&self) -> Cents {
        self.items.iter().map(|i| i.amount).sum::<Cents>()
            + self.taxes.iter().map(|c| c.amount).sum::<Cents>()
            + self.fees.iter().map(|c| c.amount).sum::<Cents>()
    }
}

/// The full OCR to receipt pipeline with its configuration and category
/// rules.
pub struct ReceiptParser {
    cluster: ClusterConfig,
    classifier: Classifier,
    assembly: AssemblyConfig,
    categories: CategoryRules,
}

impl ReceiptParser {
    pub fn new(config: &Config, categories: CategoryRules) -> Result<Self, regex::Error> {
        Ok(Self {
            cluster: config.cluster.clone(),
            classifier: Classifier::new(&config.classify)?,
            assembly: config.assembly.clone(),
            categories,
        })
    }

    pub fn parse(&self, boxes: &[OcrBox]) -> Result<ParsedReceipt, ReceiptError> {
        let lines = cluster_lines(boxes, &self.cluster)?;
        let classified = self.classifier.classify(lines);
        assemble::assemble(&classified, &self.categories, &self.assembly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::BBox;

    /// One box per line, description at the left and amount at the right.
    fn receipt_boxes(lines: &[(&str, &str)]) -> Vec<OcrBox> {
        let mut boxes = Vec::new();
        for (i, (left, right)) in lines.iter().enumerate() {
            let y = i as f64 * 30.0;
            boxes.push(OcrBox::new(*left, BBox::new(10.0, y, 200.0, y + 20.0), 0.95));
            if !right.is_empty() {
                boxes.push(OcrBox::new(*right, BBox::new(300.0, y + 1.0, 360.0, y + 21.0), 0.9));
            }
        }
        boxes
    }

    #[test]
    fn parses_loblaw_receipt() {
        let categories = crate::categories::source::load_from_path(std::path::Path::new(
            "testdata/categories/grocery.ron",
        ))
        .unwrap();
        let parser = ReceiptParser::new(&Config::default(), categories).unwrap();
        let receipt = parser
            .parse(&receipt_boxes(&[
                ("LOBLAW", ""),
                ("COORS LIGHT 6 PK HQ", "13.99"),
                ("DEPOSIT 1", "0.60"),
                ("H=HST 13%", "1.82"),
                ("TOTAL", "16.41"),
            ]))
            .unwrap();
        assert_eq!(Some("LOBLAW".to_string()), receipt.merchant);
        assert_eq!(Cents(1641), receipt.total);
        assert_eq!(1, receipt.items.len());
        assert_eq!(Cents(1399), receipt.items[0].amount);
        assert_eq!("Expenses:Food:AlcoholicBeverage", receipt.items[0].category);
        assert_eq!(vec![Cents(182)], receipt.taxes.iter().map(|c| c.amount).collect::<Vec<_>>());
        assert_eq!(vec![Cents(60)], receipt.fees.iter().map(|c| c.amount).collect::<Vec<_>>());
        assert_eq!(Cents::ZERO, receipt.unbalanced_remainder);
        assert!(receipt.warnings.is_empty());
    }

    #[test]
    fn missing_total() {
        let parser = ReceiptParser::new(&Config::default(), CategoryRules::default()).unwrap();
        let err = parser
            .parse(&receipt_boxes(&[("LOBLAW", ""), ("BREAD", "2.99")]))
            .unwrap_err();
        assert!(matches!(err, ReceiptError::MissingTotal));
    }

    #[test]
    fn malformed_box() {
        let parser = ReceiptParser::new(&Config::default(), CategoryRules::default()).unwrap();
        let boxes = vec![OcrBox::new("TOTAL", BBox::new(0.0, 0.0, 10.0, 10.0), 1.5)];
        assert!(matches!(
            parser.parse(&boxes).unwrap_err(),
            ReceiptError::Ocr(OcrError::MalformedBox { index: 0, .. })
        ));
    }
}
