//! Text helpers for receipt lines: description cleanup, quantity modifier
//! lines and section headers.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use crate::money::Cents;
use crate::receipt::amount::parse_number;

lazy_static! {
    static ref QTY_PREFIX: Regex = Regex::new(r"^\(\d+\)\s*").unwrap();
    static ref SALE_MARKER: Regex = Regex::new(r"(?i)\((?:SALE|H+ED[^)]*)\)\s*").unwrap();
    static ref MULTI_PRICE: Regex = Regex::new(r"@?\d+/[A-Za-z]?\$?\d+\.\d{2}").unwrap();
    static ref UNIT_PRICE: Regex = Regex::new(r"\$\d+\.\d+/\w+").unwrap();
    static ref DOLLAR_PRICE: Regex = Regex::new(r"\$\d+\.\d{2}").unwrap();
    static ref SKU_PREFIX: Regex = Regex::new(r"^\d{6,}\s*").unwrap();
    static ref LEADING_JUNK: Regex = Regex::new(r"^[^A-Za-z0-9]+").unwrap();
    static ref TRAILING_JUNK: Regex = Regex::new(r"[^A-Za-z0-9)]+$").unwrap();
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();

    static ref COUNT_AT_PRICE: Regex =
        Regex::new(r"^(\d+)\s*@\s*\$?(\d+[.,]\d{2})").unwrap();
    static ref WEIGHT_AT_PRICE: Regex =
        Regex::new(r"(?i)^(\d+(?:\.\d*)?)\s*(?:lb|lk|kg|k[g9]|1b|1k)\s*@").unwrap();
    static ref MULTI_FOR_PRICE: Regex =
        Regex::new(r"(?i)^\(?(\d+)\s*/\s*for\s+\$?(\d+[.,]\d{2})\)?").unwrap();
    static ref OTHER_QUANTITY: Regex = Regex::new(
        r"(?i)^(?:\d+\s*/\s*for\b|\d+\s*@\s*\d+\s*/\s*\$?\d+\.\d{2}\b|\([^)]+\)\s+\d+\s*/\s*for\b)"
    )
    .unwrap();

    static ref AISLE_HEADER: Regex = Regex::new(r"^\d{1,2}\s*[-:]\s*[A-Z]{3,}$").unwrap();
    static ref AISLE_PREFIX: Regex = Regex::new(r"^\d{1,2}\s*[-:]").unwrap();
    static ref WORD: Regex = Regex::new(r"[A-Z]+").unwrap();
}

const SECTION_HEADERS: &[&str] = &[
    "MEAT", "SEAFOOD", "PRODUCE", "DELI", "GROCERY", "BAKERY", "FROZEN", "DAIRY",
];

/// Removes OCR and receipt-printing artifacts from an item description:
/// quantity prefixes, SKU runs, sale markers, embedded unit prices, stray
/// punctuation and repeated whitespace.
pub fn clean_description(desc: &str) -> String {
    let mut s = QTY_PREFIX.replace(desc.trim(), "").into_owned();
    for re in [&*SALE_MARKER, &*MULTI_PRICE, &*UNIT_PRICE, &*DOLLAR_PRICE] {
        s = re.replace_all(&s, "").into_owned();
    }
    s = SKU_PREFIX.replace(s.trim_start(), "").into_owned();
    s = LEADING_JUNK.replace(&s, "").into_owned();
    s = TRAILING_JUNK.replace(&s, "").into_owned();
    SPACES.replace_all(&s, " ").trim().to_string()
}

/// True for aisle or department headings such as `PRODUCE` or `21-GROCERY`.
pub fn is_section_header(text: &str) -> bool {
    let normalized = SPACES.replace_all(text.trim(), " ").to_uppercase();
    if normalized.is_empty() {
        return false;
    }
    if SECTION_HEADERS.contains(&normalized.as_str()) || AISLE_HEADER.is_match(&normalized) {
        return true;
    }
    AISLE_PREFIX.is_match(&normalized)
        && WORD
            .find_iter(&normalized)
            .any(|m| SECTION_HEADERS.contains(&m.as_str()))
}

/// A line that qualifies the quantity of a neighbouring item rather than
/// being an item itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuantityModifier {
    /// `3 @ $1.99`
    CountAtPrice { count: u32, unit_price: Cents },
    /// `1.22 lb @ $2.99/lb`
    WeightAtPrice { weight: Decimal },
    /// `2 /for $3.00`
    MultiForPrice { count: u32, deal_price: Cents },
}

impl QuantityModifier {
    pub fn parse(text: &str) -> Option<Self> {
        Self::split(text).map(|(modifier, _)| modifier)
    }

    /// Parses a modifier at the start of `text`, returning it with the rest
    /// of the line (which may carry the line price).
    pub fn split(text: &str) -> Option<(Self, &str)> {
        let text = text.trim();
        if let Some(c) = COUNT_AT_PRICE.captures(text) {
            let modifier = QuantityModifier::CountAtPrice {
                count: c[1].parse().ok()?,
                unit_price: parse_number(&c[2]).ok()?,
            };
            return Some((modifier, &text[c.get(0)?.end()..]));
        }
        if let Some(c) = WEIGHT_AT_PRICE.captures(text) {
            let modifier = QuantityModifier::WeightAtPrice {
                weight: c[1].parse().ok()?,
            };
            return Some((modifier, &text[c.get(0)?.end()..]));
        }
        if let Some(c) = MULTI_FOR_PRICE.captures(text) {
            let count: u32 = c[1].parse().ok()?;
            if count == 0 {
                return None;
            }
            let modifier = QuantityModifier::MultiForPrice {
                count,
                deal_price: parse_number(&c[2]).ok()?,
            };
            return Some((modifier, &text[c.get(0)?.end()..]));
        }
        None
    }

    /// Item count implied by the modifier. Weighed items count as one.
    pub fn quantity(&self) -> u32 {
        use QuantityModifier::*;
        match self {
            CountAtPrice { count, .. } | MultiForPrice { count, .. } => *count,
            WeightAtPrice { .. } => 1,
        }
    }

    /// Whether the modifier is consistent with an item line price. Weighed
    /// items cannot be checked without the unit price and always agree.
    pub fn agrees_with(&self, price: Cents, tolerance: Cents) -> bool {
        use QuantityModifier::*;
        match self {
            CountAtPrice { count, unit_price } => unit_price
                .0
                .checked_mul(i64::from(*count))
                .map_or(false, |line| (Cents(line) - price).abs() <= tolerance),
            MultiForPrice { deal_price, .. } => (*deal_price - price).abs() <= tolerance,
            WeightAtPrice { .. } => true,
        }
    }
}

/// True for any quantity or offer expression, including formats that carry
/// no parseable quantity.
pub fn is_quantity_expression(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && (QuantityModifier::parse(text).is_some() || OTHER_QUANTITY.is_match(text))
}
