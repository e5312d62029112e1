//! Recognition of lines that consist of a purchase date.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref YMD: Regex = Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})$").unwrap();
    static ref YMD_COMPACT: Regex = Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap();
    static ref MDY: Regex = Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{2}|\d{4})$").unwrap();
    static ref MONTH_FIRST: Regex =
        Regex::new(r"(?i)^([a-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})$").unwrap();
    static ref DAY_FIRST: Regex =
        Regex::new(r"(?i)^(\d{1,2})\s+([a-z]{3,9})\.?,?\s+(\d{4})$").unwrap();
    // Optional leading label and trailing time of day around the date.
    static ref DATE_LINE: Regex = Regex::new(
        r"(?ix)
        ^\s*
        (?:(?:date|dt|trans(?:action)?\s+date)\s*[:\#]?\s*)?
        (?P<date>.+?)
        (?:\s+(?:time\s*:?\s*)?\d{1,2}:\d{2}(?::\d{2})?(?:\s*[ap]\.?m\.?)?)?
        \s*$"
    )
    .unwrap();
}

/// Returns the date if the whole line is a date, possibly labelled and
/// followed by a time of day.
pub fn line_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_LINE.captures(text)?;
    parse_date(caps.name("date")?.as_str().trim())
}

/// Parses a single date in one of the formats printed on North American
/// receipts. Slash-separated numeric dates are read month first.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Some(c) = YMD.captures(s).or_else(|| YMD_COMPACT.captures(s)) {
        return ymd(num(&c[1])?, num(&c[2])?, num(&c[3])?);
    }
    if let Some(c) = MDY.captures(s) {
        let year = match num(&c[3])? {
            y if c[3].len() == 2 && y <= 69 => 2000 + y,
            y if c[3].len() == 2 => 1900 + y,
            y => y,
        };
        return ymd(year, num(&c[1])?, num(&c[2])?);
    }
    if let Some(c) = MONTH_FIRST.captures(s) {
        return ymd(num(&c[3])?, month(&c[1])?, num(&c[2])?);
    }
    if let Some(c) = DAY_FIRST.captures(s) {
        return ymd(num(&c[3])?, month(&c[2])?, num(&c[1])?);
    }
    None
}

fn num(s: &str) -> Option<i32> {
    s.parse().ok()
}

fn ymd(year: i32, month: i32, day: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

fn month(name: &str) -> Option<i32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = name.to_ascii_lowercase();
    let prefix = lower.get(..3)?;
    let idx = MONTHS.iter().position(|m| *m == prefix)?;
    i32::try_from(idx + 1).ok()
}
