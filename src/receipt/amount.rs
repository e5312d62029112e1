//! Extraction of currency amounts from noisy OCR text.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::money::Cents;

lazy_static! {
    // An amount at the end of a line: optional sign and currency symbol, a
    // digit run containing at least one separator, then an optional trailing
    // minus and tax flag letters (`H`, `J`, `HQ`, `*`).
    static ref TRAILING_AMOUNT: Regex = Regex::new(
        r"(?x)
        (?:^|[\s:=\#@*(])
        (?P<amt>
            (?P<neg>-)?
            \$?\s?
            (?P<num>[0-9Oo]+(?:[.,][0-9Oo]+)+)
            (?P<neg2>-)?
        )
        (?:\s*(?:[A-Za-z]{1,2}|\*))?
        \s*$"
    )
    .unwrap();
}

/// Receipt amounts at or above this many whole units are OCR noise.
const MAX_UNITS: i64 = 10_000_000;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount {0:?} has more than one decimal separator")]
    MultipleDecimalSeparators(String),
    #[error("amount {0:?} does not end in exactly two fraction digits")]
    MalformedFraction(String),
    #[error("amount {0:?} has malformed digit grouping")]
    MalformedGrouping(String),
    #[error("amount {0:?} is out of range")]
    OutOfRange(String),
}

/// An amount found at the end of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrailingAmount {
    pub amount: Cents,
    /// Byte offset where the amount (including any sign or currency symbol)
    /// starts, so that `&text[..start]` is the label or description.
    pub start: usize,
}

/// Finds a trailing currency amount in `text`.
///
/// Returns `Ok(None)` if the line does not end in something amount-shaped
/// (integers such as quantities or SKUs are not amounts), and an error if it
/// does but the digits cannot be read unambiguously.
pub fn trailing_amount(text: &str) -> Result<Option<TrailingAmount>, AmountError> {
    let caps = match TRAILING_AMOUNT.captures(text) {
        Some(caps) => caps,
        None => return Ok(None),
    };
    let (amt, num) = match (caps.name("amt"), caps.name("num")) {
        (Some(amt), Some(num)) => (amt, num),
        _ => return Ok(None),
    };
    if !num.as_str().bytes().any(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    let mut amount = parse_number(num.as_str())?;
    if caps.name("neg").is_some() || caps.name("neg2").is_some() {
        amount = -amount;
    }
    Ok(Some(TrailingAmount {
        amount,
        start: amt.start(),
    }))
}

/// Parses digits with one decimal separator and exactly two fraction digits,
/// optionally grouped in thousands by the other separator. `O`/`o` are read
/// as zero. Amounts of `MAX_UNITS` or more are out of range.
pub fn parse_number(raw: &str) -> Result<Cents, AmountError> {
    let s: String = raw
        .chars()
        .map(|c| match c {
            'O' | 'o' => '0',
            c => c,
        })
        .collect();

    let sep_pos = match s.rfind(|c| c == '.' || c == ',') {
        Some(pos) => pos,
        None => return Err(AmountError::MalformedFraction(raw.to_string())),
    };
    let sep = s[sep_pos..].chars().next().unwrap_or('.');
    let (int_part, frac) = (&s[..sep_pos], &s[sep_pos + 1..]);

    if frac.len() != 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::MalformedFraction(raw.to_string()));
    }
    if int_part.contains(sep) {
        return Err(AmountError::MultipleDecimalSeparators(raw.to_string()));
    }

    let group_sep = if sep == '.' { ',' } else { '.' };
    let mut digits = String::with_capacity(int_part.len());
    for (i, group) in int_part.split(group_sep).enumerate() {
        let grouped = int_part.contains(group_sep);
        let ok_len = if !grouped {
            !group.is_empty()
        } else if i == 0 {
            (1..=3).contains(&group.len())
        } else {
            group.len() == 3
        };
        if !ok_len || !group.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::MalformedGrouping(raw.to_string()));
        }
        digits.push_str(group);
    }

    let units = match digits.parse::<i64>() {
        Ok(units) if units < MAX_UNITS => units,
        _ => return Err(AmountError::OutOfRange(raw.to_string())),
    };
    let minor: i64 = frac
        .parse()
        .map_err(|_| AmountError::MalformedFraction(raw.to_string()))?;
    Ok(Cents(units * 100 + minor))
}
