//! Expectation documents that pin the parts of a parsed receipt that must
//! come out right, used for regression checks over real scans.

use std::fmt;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_derive::Deserialize;

use crate::filespec::{self, FileSpec};
use crate::money::Cents;
use crate::receipt::ParsedReceipt;

pub mod cmd;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    pub total: Cents,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub merchant: Option<String>,
    /// Acceptable merchant names, in addition to `merchant`.
    #[serde(default)]
    pub merchant_any_of: Vec<String>,
    #[serde(default)]
    pub critical_items: Vec<ExpectedItem>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExpectedItem {
    /// Matched case-insensitively as a substring of the item description.
    pub description: String,
    pub price: Cents,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Mismatch {
    Total {
        want: Cents,
        got: Cents,
    },
    Date {
        want: NaiveDate,
        got: Option<NaiveDate>,
    },
    Merchant {
        want: Vec<String>,
        got: Option<String>,
    },
    MissingItem {
        description: String,
        price: Cents,
    },
    Category {
        description: String,
        want: String,
        got: String,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use Mismatch::*;
        match self {
            Total { want, got } => write!(f, "total: want {}, got {}", want, got),
            Date { want, got: Some(got) } => write!(f, "date: want {}, got {}", want, got),
            Date { want, got: None } => write!(f, "date: want {}, got none", want),
            Merchant { want, got } => write!(f, "merchant: want one of {:?}, got {:?}", want, got),
            MissingItem { description, price } => {
                write!(f, "item: no {:?} at {}", description, price)
            }
            Category {
                description,
                want,
                got,
            } => write!(f, "category of {:?}: want {}, got {}", description, want, got),
        }
    }
}

impl Expectation {
    pub fn load(file_spec: &FileSpec) -> Result<Self> {
        let content = filespec::read_file(file_spec)?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", file_spec))
    }

    /// Lists every way `receipt` falls short of the expectation.
    pub fn check(&self, receipt: &ParsedReceipt) -> Vec<Mismatch> {
        let mut mismatches = Vec::new();

        if receipt.total != self.total {
            mismatches.push(Mismatch::Total {
                want: self.total,
                got: receipt.total,
            });
        }

        if let Some(want) = self.date {
            if receipt.date != Some(want) {
                mismatches.push(Mismatch::Date {
                    want,
                    got: receipt.date,
                });
            }
        }

        let merchants: Vec<String> = self
            .merchant
            .iter()
            .chain(&self.merchant_any_of)
            .cloned()
            .collect();
        if !merchants.is_empty() {
            let got = receipt.merchant.as_deref().map(normalize);
            if !merchants.iter().any(|m| Some(normalize(m)) == got) {
                mismatches.push(Mismatch::Merchant {
                    want: merchants,
                    got: receipt.merchant.clone(),
                });
            }
        }

        for want in &self.critical_items {
            let needle = normalize(&want.description);
            let found = receipt
                .items
                .iter()
                .find(|item| item.amount == want.price && normalize(&item.description).contains(&needle));
            match (found, &want.category) {
                (None, _) => mismatches.push(Mismatch::MissingItem {
                    description: want.description.clone(),
                    price: want.price,
                }),
                (Some(item), Some(category)) if &item.category != category => {
                    mismatches.push(Mismatch::Category {
                        description: want.description.clone(),
                        want: category.clone(),
                        got: item.category.clone(),
                    })
                }
                _ => {}
            }
        }

        mismatches
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::categories::source;
    use crate::config::Config;
    use crate::ocr::{read_boxes, InputFormat};
    use crate::receipt::{LineItem, ReceiptParser};

    fn receipt() -> ParsedReceipt {
        ParsedReceipt {
            merchant: Some("Loblaw".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 1, 15),
            total: Cents(1641),
            items: vec![LineItem {
                description: "COORS LIGHT 6 PK HQ".to_string(),
                amount: Cents(1399),
                category: "Expenses:Food:AlcoholicBeverage".to_string(),
                confidence: 0.95,
                quantity: 1,
            }],
            taxes: Vec::new(),
            fees: Vec::new(),
            subtotal: None,
            warnings: Vec::new(),
            raw_text: String::new(),
            unbalanced_remainder: Cents(242),
        }
    }

    fn expectation(s: &str) -> Expectation {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn satisfied() {
        let want = expectation(
            r#"{
                "total": "16.41",
                "date": "2024-01-15",
                "merchant_any_of": ["LOBLAWS", "LOBLAW"],
                "critical_items": [
                    {"description": "coors light", "price": "13.99",
                     "category": "Expenses:Food:AlcoholicBeverage"}
                ]
            }"#,
        );
        assert_eq!(Vec::<Mismatch>::new(), want.check(&receipt()));
    }

    #[test]
    fn reports_every_mismatch() {
        let want = expectation(
            r#"{
                "total": 1650,
                "date": "2024-01-16",
                "merchant": "NO FRILLS",
                "critical_items": [
                    {"description": "COORS", "price": "13.99", "category": "Expenses:Food:Beer"},
                    {"description": "BREAD", "price": "2.99"}
                ]
            }"#,
        );
        let got: Vec<String> = want.check(&receipt()).iter().map(ToString::to_string).collect();
        assert_eq!(
            vec![
                "total: want 16.50, got 16.41",
                "date: want 2024-01-16, got 2024-01-15",
                r#"merchant: want one of ["NO FRILLS"], got Some("Loblaw")"#,
                r#"category of "COORS": want Expenses:Food:Beer, got Expenses:Food:AlcoholicBeverage"#,
                r#"item: no "BREAD" at 2.99"#,
            ],
            got
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(serde_json::from_str::<Expectation>(r#"{"total": "1.00", "totl": "2.00"}"#).is_err());
    }

    /// Parses every `testdata/receipts/*.ocr.json` that has an expectation
    /// next to it and checks it.
    #[test]
    fn receipt_fixtures() {
        let categories =
            source::load_from_path(Path::new("testdata/categories/grocery.ron")).unwrap();
        let parser = ReceiptParser::new(&Config::default(), categories).unwrap();

        let mut checked = 0;
        for entry in glob::glob("testdata/receipts/*.expected.json").unwrap() {
            let expected_path: PathBuf = entry.unwrap();
            let name = expected_path.to_string_lossy();
            let input_path = PathBuf::from(name.replace(".expected.json", ".ocr.json"));

            let want = Expectation::load(&FileSpec::Path(expected_path.clone())).unwrap();
            let boxes = read_boxes(
                std::fs::File::open(&input_path).unwrap(),
                InputFormat::Json,
            )
            .unwrap();
            let receipt = parser.parse(&boxes).unwrap();
            let mismatches = want.check(&receipt);
            assert!(
                mismatches.is_empty(),
                "{}: {:#?}\nparsed: {:#?}",
                input_path.display(),
                mismatches,
                receipt
            );
            checked += 1;
        }
        assert!(checked >= 2, "only {} fixtures found", checked);
    }
}
