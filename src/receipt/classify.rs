//! Assigns a role to every clustered receipt line.
//!
//! Classification runs in passes over the whole line sequence: each line is
//! first drafted on its own content, then context rules (two-line summary
//! labels, the merchant line, orphan prices, quantity modifiers and the footer
//! after the last total) settle the final roles. The result depends only on
//! the line texts and confidences.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use crate::money::Cents;
use crate::ocr::cluster::TextLine;
use crate::receipt::amount::{trailing_amount, AmountError};
use crate::receipt::date::line_date;
use crate::receipt::text::{
    clean_description, is_quantity_expression, is_section_header, QuantityModifier,
};

lazy_static! {
    static ref MERCHANT_JUNK: Regex = Regex::new(r"[^\w\s&'-]").unwrap();
    static ref NUMERIC_ONLY: Regex = Regex::new(r"^[\d/\-:\s]+$").unwrap();
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// Keyword sets and thresholds for line classification. Keywords match whole
/// words, case-insensitively.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ClassifyConfig {
    pub total_keywords: Vec<String>,
    /// Phrases that contain a total keyword but do not state the amount paid.
    pub total_exclusions: Vec<String>,
    pub subtotal_keywords: Vec<String>,
    pub tax_keywords: Vec<String>,
    pub fee_keywords: Vec<String>,
    /// Tender and footer words; priced lines carrying them are not items.
    pub payment_keywords: Vec<String>,
    /// Merchant names that win over the top-of-receipt heuristic when found.
    pub known_merchants: Vec<String>,
    pub min_line_confidence: f64,
    pub min_merchant_letters: usize,
    /// Only this many lines from the top are considered for the merchant.
    pub merchant_search_lines: usize,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            total_keywords: strings(&["TOTAL", "AMOUNT DUE"]),
            total_exclusions: strings(&[
                "SUB TOTAL",
                "SUB-TOTAL",
                "TOTAL SAVINGS",
                "TOTAL SAVED",
                "TOTAL DISCOUNT",
                "TOTAL NUMBER",
                "TOTAL ITEMS",
                "TOTAL HST",
                "TOTAL GST",
                "TOTAL PST",
                "TOTAL QST",
                "TOTAL TAX",
            ]),
            subtotal_keywords: strings(&["SUBTOTAL", "SUB TOTAL", "SUB-TOTAL"]),
            tax_keywords: strings(&["HST", "GST", "PST", "QST", "TAX", "VAT"]),
            fee_keywords: strings(&[
                "DEPOSIT",
                "DEP",
                "BOTTLE DEPOSIT",
                "ECO FEE",
                "ENVIRO FEE",
                "ENVIRONMENTAL FEE",
                "BAG FEE",
            ]),
            payment_keywords: strings(&[
                "VISA",
                "MASTERCARD",
                "MASTER",
                "AMEX",
                "DEBIT",
                "CREDIT",
                "CASH",
                "CHANGE",
                "TENDER",
                "POINTS",
                "BALANCE",
                "APPROVED",
                "CARD",
                "TERMINAL",
                "AUTH",
                "SAVINGS",
                "SAVED",
                "MEMBER",
            ]),
            known_merchants: Vec::new(),
            min_line_confidence: 0.6,
            min_merchant_letters: 3,
            merchant_search_lines: 10,
        }
    }
}

/// Why a line carries no financial meaning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoiseReason {
    Unclassified,
    UnparsableAmount(AmountError),
    /// A summary keyword whose amount is on the following line.
    SummaryLabel,
    /// Text used as the description of the priced line below it.
    ItemDescription,
    QuantityModifier,
    Payment,
    SectionHeader,
    /// An item, tax or fee line after the last total.
    AfterTotal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineRole {
    Merchant(String),
    Date(NaiveDate),
    Item {
        description: String,
        amount: Cents,
        quantity: u32,
    },
    Tax {
        label: String,
        amount: Cents,
    },
    DepositFee {
        label: String,
        amount: Cents,
    },
    Subtotal(Cents),
    Total(Cents),
    Noise(NoiseReason),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedLine {
    pub line: TextLine,
    pub role: LineRole,
    /// Minimum confidence of the lines contributing to the role.
    pub confidence: f64,
}

/// The classified lines of one receipt, in line order.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedLines(pub Vec<ClassifiedLine>);

impl ClassifiedLines {
    pub fn iter(&self) -> std::slice::Iter<'_, ClassifiedLine> {
        self.0.iter()
    }

    /// Index and amount of the last total line, or `None` when the receipt
    /// never states a total.
    pub fn total(&self) -> Option<(usize, Cents)> {
        self.0
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, cl)| match cl.role {
                LineRole::Total(amount) => Some((i, amount)),
                _ => None,
            })
    }
}

/// Whole-word, case-insensitive matcher over a list of phrases.
#[derive(Debug)]
struct KeywordSet(Option<Regex>);

impl KeywordSet {
    fn new(keywords: &[String]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(|k| {
                k.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect();
        if alternatives.is_empty() {
            return Ok(KeywordSet(None));
        }
        let pattern = format!(
            r"(?i)(?:^|[^[:alnum:]])(?:{})(?:$|[^[:alnum:]])",
            alternatives.join("|")
        );
        Regex::new(&pattern).map(|re| KeywordSet(Some(re)))
    }

    fn is_match(&self, text: &str) -> bool {
        self.0.as_ref().map_or(false, |re| re.is_match(text))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Summary {
    Total,
    Subtotal,
    Tax,
    Fee,
}

impl Summary {
    fn role(self, label: &str, amount: Cents) -> LineRole {
        match self {
            Summary::Total => LineRole::Total(amount),
            Summary::Subtotal => LineRole::Subtotal(amount),
            Summary::Tax => LineRole::Tax {
                label: label.to_string(),
                amount,
            },
            Summary::Fee => LineRole::DepositFee {
                label: label.to_string(),
                amount,
            },
        }
    }
}

/// Per-line classification before context is taken into account.
#[derive(Clone, Debug)]
enum Draft {
    Role(LineRole),
    Label(Summary, String),
    BareAmount(Cents),
    PricedModifier(QuantityModifier, Cents),
    Modifier(Option<QuantityModifier>),
    Text,
}

pub struct Classifier {
    config: ClassifyConfig,
    total: KeywordSet,
    total_exclusions: KeywordSet,
    subtotal: KeywordSet,
    tax: KeywordSet,
    fee: KeywordSet,
    payment: KeywordSet,
    /// Longest names first, so that the most specific merchant wins.
    known_merchants: Vec<(String, KeywordSet)>,
}

impl Classifier {
    pub fn new(config: &ClassifyConfig) -> Result<Self, regex::Error> {
        let mut known_merchants = config
            .known_merchants
            .iter()
            .map(|m| Ok((m.clone(), KeywordSet::new(std::slice::from_ref(m))?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        known_merchants.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));
        Ok(Self {
            total: KeywordSet::new(&config.total_keywords)?,
            total_exclusions: KeywordSet::new(&config.total_exclusions)?,
            subtotal: KeywordSet::new(&config.subtotal_keywords)?,
            tax: KeywordSet::new(&config.tax_keywords)?,
            fee: KeywordSet::new(&config.fee_keywords)?,
            payment: KeywordSet::new(&config.payment_keywords)?,
            known_merchants,
            config: config.clone(),
        })
    }

    pub fn classify(&self, lines: Vec<TextLine>) -> ClassifiedLines {
        let mut drafts: Vec<Draft> = lines.iter().map(|l| self.draft(&l.text)).collect();
        let mut confidence: Vec<f64> = lines.iter().map(|l| l.confidence).collect();

        self.join_summary_labels(&mut drafts, &mut confidence);
        let merchant = self.pick_merchant(&lines, &drafts);
        if let Some((i, ref name)) = merchant {
            drafts[i] = Draft::Role(LineRole::Merchant(name.clone()));
        }
        self.attach_descriptions(&lines, &mut drafts, &mut confidence);
        apply_modifiers(&mut drafts);
        suppress_footer(&mut drafts);

        let classified: Vec<ClassifiedLine> = lines
            .into_iter()
            .zip(drafts)
            .zip(confidence)
            .map(|((line, draft), confidence)| ClassifiedLine {
                line,
                role: draft.into_role(),
                confidence,
            })
            .collect();

        for cl in &classified {
            debug!(text = %cl.line.text, role = ?cl.role, "classified line");
        }
        ClassifiedLines(classified)
    }

    fn summary_kind(&self, label: &str) -> Option<Summary> {
        if self.total.is_match(label) && !self.total_exclusions.is_match(label) {
            Some(Summary::Total)
        } else if self.subtotal.is_match(label) {
            Some(Summary::Subtotal)
        } else if self.tax.is_match(label) {
            Some(Summary::Tax)
        } else if self.fee.is_match(label) {
            Some(Summary::Fee)
        } else {
            None
        }
    }

    fn draft(&self, text: &str) -> Draft {
        let text = text.trim();

        if let Some((modifier, rest)) = QuantityModifier::split(text) {
            return match trailing_amount(rest) {
                Ok(Some(ta)) => Draft::PricedModifier(modifier, ta.amount),
                _ => Draft::Modifier(Some(modifier)),
            };
        }
        if is_quantity_expression(text) {
            return Draft::Modifier(None);
        }

        match trailing_amount(text) {
            Ok(Some(ta)) => {
                let label = text[..ta.start].trim();
                if let Some(kind) = self.summary_kind(label) {
                    Draft::Role(kind.role(label, ta.amount))
                } else if let Some(date) = line_date(text) {
                    Draft::Role(LineRole::Date(date))
                } else if label.is_empty() {
                    Draft::BareAmount(ta.amount)
                } else if self.payment.is_match(label) {
                    Draft::Role(LineRole::Noise(NoiseReason::Payment))
                } else {
                    Draft::Role(LineRole::Item {
                        description: clean_description(label),
                        amount: ta.amount,
                        quantity: 1,
                    })
                }
            }
            Ok(None) => {
                if let Some(date) = line_date(text) {
                    Draft::Role(LineRole::Date(date))
                } else if let Some(kind) = self.summary_kind(text) {
                    Draft::Label(kind, text.to_string())
                } else if is_section_header(text) {
                    Draft::Role(LineRole::Noise(NoiseReason::SectionHeader))
                } else {
                    Draft::Text
                }
            }
            Err(err) => match line_date(text) {
                Some(date) => Draft::Role(LineRole::Date(date)),
                None => Draft::Role(LineRole::Noise(NoiseReason::UnparsableAmount(err))),
            },
        }
    }

    /// A summary keyword line directly followed by a bare amount gives that
    /// amount the keyword's role.
    fn join_summary_labels(&self, drafts: &mut [Draft], confidence: &mut [f64]) {
        for i in 1..drafts.len() {
            let joined = match (&drafts[i - 1], &drafts[i]) {
                (Draft::Label(kind, label), Draft::BareAmount(amount)) => {
                    Some(kind.role(label, *amount))
                }
                _ => None,
            };
            if let Some(role) = joined {
                drafts[i] = Draft::Role(role);
                drafts[i - 1] = Draft::Role(LineRole::Noise(NoiseReason::SummaryLabel));
                confidence[i] = confidence[i].min(confidence[i - 1]);
            }
        }
    }

    fn pick_merchant(&self, lines: &[TextLine], drafts: &[Draft]) -> Option<(usize, String)> {
        let texts = || {
            lines
                .iter()
                .zip(drafts)
                .enumerate()
                .filter(|(_, (_, d))| matches!(d, Draft::Text))
                .map(|(i, (line, _))| (i, line))
        };

        for (name, matcher) in &self.known_merchants {
            if let Some((i, _)) = texts().find(|(_, line)| matcher.is_match(&line.text)) {
                return Some((i, name.clone()));
            }
        }

        texts()
            .take_while(|(i, _)| *i < self.config.merchant_search_lines)
            .find(|(_, line)| self.is_merchant_like(line))
            .map(|(i, line)| (i, merchant_name(&line.text)))
    }

    fn is_merchant_like(&self, line: &TextLine) -> bool {
        let letters = line.text.chars().filter(|c| c.is_alphabetic()).count();
        line.confidence >= self.config.min_line_confidence
            && letters >= self.config.min_merchant_letters
            && !NUMERIC_ONLY.is_match(&line.text)
            && !self.payment.is_match(&line.text)
            && merchant_name(&line.text).chars().count() > 2
    }

    fn is_descriptive(&self, line: &TextLine) -> bool {
        line.text.chars().any(|c| c.is_alphabetic()) && !self.payment.is_match(&line.text)
    }

    /// Bare prices and priced modifier lines take their description from a
    /// descriptive line directly above.
    fn attach_descriptions(&self, lines: &[TextLine], drafts: &mut [Draft], confidence: &mut [f64]) {
        for i in 0..drafts.len() {
            let (amount, quantity) = match &drafts[i] {
                Draft::BareAmount(amount) => (*amount, 1),
                Draft::PricedModifier(modifier, amount) => (*amount, modifier.quantity()),
                _ => continue,
            };
            let above = i.checked_sub(1).filter(|&j| matches!(drafts[j], Draft::Text));
            let description = match above {
                Some(j) if self.is_descriptive(&lines[j]) => {
                    drafts[j] = Draft::Role(LineRole::Noise(NoiseReason::ItemDescription));
                    confidence[i] = confidence[i].min(confidence[j]);
                    clean_description(&lines[j].text)
                }
                Some(j) if self.payment.is_match(&lines[j].text) => {
                    drafts[i] = Draft::Role(LineRole::Noise(NoiseReason::Payment));
                    continue;
                }
                _ => String::new(),
            };
            drafts[i] = Draft::Role(LineRole::Item {
                description,
                amount,
                quantity,
            });
        }
    }
}

/// Unpriced quantity modifiers set the quantity of the item directly below
/// or, failing that, directly above when the prices agree.
fn apply_modifiers(drafts: &mut [Draft]) {
    const TOLERANCE: Cents = Cents(2);
    for i in 0..drafts.len() {
        let modifier = match &drafts[i] {
            Draft::Modifier(Some(m)) => m.clone(),
            _ => continue,
        };
        let neighbours = [i + 1, i.wrapping_sub(1)];
        for j in neighbours {
            if let Some(Draft::Role(LineRole::Item {
                amount, quantity, ..
            })) = drafts.get_mut(j)
            {
                if modifier.agrees_with(*amount, TOLERANCE) {
                    *quantity = modifier.quantity();
                    break;
                }
            }
        }
    }
}

/// Lines after the last total belong to the payment footer, where taxes and
/// fees are only ever repeated.
fn suppress_footer(drafts: &mut [Draft]) {
    let last_total = drafts
        .iter()
        .rposition(|d| matches!(d, Draft::Role(LineRole::Total(_))));
    if let Some(last_total) = last_total {
        for d in &mut drafts[last_total + 1..] {
            if matches!(
                d,
                Draft::Role(LineRole::Item { .. } | LineRole::Tax { .. } | LineRole::DepositFee { .. })
            ) {
                *d = Draft::Role(LineRole::Noise(NoiseReason::AfterTotal));
            }
        }
    }
}

fn merchant_name(text: &str) -> String {
    let cleaned = MERCHANT_JUNK.replace_all(text, "");
    SPACES.replace_all(cleaned.trim(), " ").into_owned()
}

impl Draft {
    fn into_role(self) -> LineRole {
        match self {
            Draft::Role(role) => role,
            Draft::Label(..) => LineRole::Noise(NoiseReason::SummaryLabel),
            Draft::Modifier(_) => LineRole::Noise(NoiseReason::QuantityModifier),
            Draft::Text => LineRole::Noise(NoiseReason::Unclassified),
            // Resolved by `attach_descriptions`.
            Draft::BareAmount(_) | Draft::PricedModifier(..) => {
                LineRole::Noise(NoiseReason::Unclassified)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn lines(texts: &[&str]) -> Vec<TextLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextLine::from_text(t, i as f64 * 20.0, 0.95))
            .collect()
    }

    fn classify(texts: &[&str]) -> Vec<LineRole> {
        classify_with(&ClassifyConfig::default(), texts)
    }

    fn classify_with(config: &ClassifyConfig, texts: &[&str]) -> Vec<LineRole> {
        Classifier::new(config)
            .unwrap()
            .classify(lines(texts))
            .0
            .into_iter()
            .map(|cl| cl.role)
            .collect()
    }

    fn item(description: &str, amount: i64) -> LineRole {
        LineRole::Item {
            description: description.to_string(),
            amount: Cents(amount),
            quantity: 1,
        }
    }

    fn noise(reason: NoiseReason) -> LineRole {
        LineRole::Noise(reason)
    }

    #[test]
    fn loblaw_receipt() {
        let got = classify(&[
            "LOBLAW",
            "01/15/2024",
            "COORS LIGHT 6 PK HQ 13.99",
            "DEPOSIT 1 0.60",
            "H=HST 13% 1.82",
            "TOTAL 16.41",
        ]);
        assert_eq!(
            vec![
                LineRole::Merchant("LOBLAW".to_string()),
                LineRole::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
                item("COORS LIGHT 6 PK HQ", 1399),
                LineRole::DepositFee {
                    label: "DEPOSIT 1".to_string(),
                    amount: Cents(60)
                },
                LineRole::Tax {
                    label: "H=HST 13%".to_string(),
                    amount: Cents(182)
                },
                LineRole::Total(Cents(1641)),
            ],
            got
        );
    }

    #[test_case("TOTAL 16.41" => LineRole::Total(Cents(1641)))]
    #[test_case("SUBTOTAL 14.59" => LineRole::Subtotal(Cents(1459)))]
    #[test_case("SUB TOTAL 14.59" => LineRole::Subtotal(Cents(1459)); "spaced subtotal")]
    #[test_case("TOTAL SAVINGS 2.00" => noise(NoiseReason::Payment))]
    #[test_case("TOTAL HST 1.82" => LineRole::Tax { label: "TOTAL HST".to_string(), amount: Cents(182) })]
    #[test_case("VISA 16.41" => noise(NoiseReason::Payment))]
    #[test_case("TOTALLY FRESH SALAD 4.99" => item("TOTALLY FRESH SALAD", 499); "keyword inside word")]
    #[test_case("MILK 1.2.34" => noise(NoiseReason::UnparsableAmount(AmountError::MultipleDecimalSeparators("1.2.34".to_string()))))]
    #[test_case("PRODUCE" => noise(NoiseReason::SectionHeader))]
    fn single_priced_line(text: &str) -> LineRole {
        // A merchant line first so that the line under test is not a merchant
        // candidate, and a later total keeps items out of the footer.
        let roles = classify(&["STORE", text]);
        roles[1].clone()
    }

    #[test]
    fn two_line_total() {
        let got = classify(&["LOBLAW", "BREAD 2.99", "TOTAL", "2.99"]);
        assert_eq!(
            vec![
                LineRole::Merchant("LOBLAW".to_string()),
                item("BREAD", 299),
                noise(NoiseReason::SummaryLabel),
                LineRole::Total(Cents(299)),
            ],
            got
        );
    }

    #[test]
    fn orphan_price_takes_description_above() {
        let got = classify(&["LOBLAW", "ORGANIC BANANAS", "1.49", "TOTAL 1.49"]);
        assert_eq!(
            vec![
                LineRole::Merchant("LOBLAW".to_string()),
                noise(NoiseReason::ItemDescription),
                item("ORGANIC BANANAS", 149),
                LineRole::Total(Cents(149)),
            ],
            got
        );
    }

    #[test]
    fn priced_weight_modifier() {
        let got = classify(&["LOBLAW", "BANANAS", "1.22 lb @ $2.99/lb 3.65", "TOTAL 3.65"]);
        assert_eq!(item("BANANAS", 365), got[2]);
        assert_eq!(noise(NoiseReason::ItemDescription), got[1]);
    }

    #[test]
    fn count_modifier_sets_quantity() {
        let got = classify(&["LOBLAW", "3 @ $1.99", "YOGURT 5.97", "TOTAL 5.97"]);
        assert_eq!(noise(NoiseReason::QuantityModifier), got[1]);
        assert_eq!(
            LineRole::Item {
                description: "YOGURT".to_string(),
                amount: Cents(597),
                quantity: 3,
            },
            got[2]
        );
    }

    #[test]
    fn disagreeing_modifier_leaves_quantity() {
        let got = classify(&["LOBLAW", "3 @ $1.99", "YOGURT 2.50", "TOTAL 2.50"]);
        assert_eq!(item("YOGURT", 250), got[2]);
    }

    #[test]
    fn footer_items_are_noise() {
        let got = classify(&["LOBLAW", "BREAD 2.99", "TOTAL 2.99", "REWARD 2.99"]);
        assert_eq!(noise(NoiseReason::AfterTotal), got[3]);
    }

    #[test]
    fn repeated_summary_in_footer_is_noise() {
        let got = classify(&[
            "LOBLAW",
            "BREAD 2.99",
            "BAG FEE 0.05",
            "HST 0.40",
            "TOTAL 3.44",
            "HST 0.40",
            "BAG FEE",
            "0.05",
        ]);
        assert_eq!(
            LineRole::Tax {
                label: "HST".to_string(),
                amount: Cents(40)
            },
            got[3]
        );
        assert_eq!(noise(NoiseReason::AfterTotal), got[5]);
        assert_eq!(noise(NoiseReason::SummaryLabel), got[6]);
        assert_eq!(noise(NoiseReason::AfterTotal), got[7]);
    }

    #[test]
    fn only_first_merchant_candidate() {
        let got = classify(&["LOBLAW", "GREAT FOOD", "BREAD 2.99", "TOTAL 2.99"]);
        assert_eq!(LineRole::Merchant("LOBLAW".to_string()), got[0]);
        assert_eq!(noise(NoiseReason::Unclassified), got[1]);
    }

    #[test]
    fn low_confidence_merchant_skipped() {
        let mut ls = lines(&["L0BL@W", "LOBLAW", "TOTAL 2.99"]);
        ls[0].confidence = 0.3;
        let roles: Vec<LineRole> = Classifier::new(&ClassifyConfig::default())
            .unwrap()
            .classify(ls)
            .0
            .into_iter()
            .map(|cl| cl.role)
            .collect();
        assert_eq!(noise(NoiseReason::Unclassified), roles[0]);
        assert_eq!(LineRole::Merchant("LOBLAW".to_string()), roles[1]);
    }

    #[test]
    fn known_merchant_wins() {
        let config = ClassifyConfig {
            known_merchants: vec!["No Frills".to_string()],
            ..ClassifyConfig::default()
        };
        let got = classify_with(&config, &["WELCOME", "YOUR NO FRILLS STORE", "TOTAL 2.99"]);
        assert_eq!(noise(NoiseReason::Unclassified), got[0]);
        assert_eq!(LineRole::Merchant("No Frills".to_string()), got[1]);
    }

    #[test]
    fn no_total() {
        let classified = Classifier::new(&ClassifyConfig::default())
            .unwrap()
            .classify(lines(&["LOBLAW", "BREAD 2.99"]));
        assert_eq!(None, classified.total());
    }

    #[test]
    fn last_total_wins() {
        let classified = Classifier::new(&ClassifyConfig::default())
            .unwrap()
            .classify(lines(&["TOTAL 3.00", "BREAD 2.99", "TOTAL 2.99"]));
        assert_eq!(Some((2, Cents(299))), classified.total());
    }

    #[test]
    fn deterministic() {
        let input = ["LOBLAW", "COORS LIGHT 13.99", "TOTAL", "13.99", "VISA 13.99"];
        assert_eq!(classify(&input), classify(&input));
    }
}
