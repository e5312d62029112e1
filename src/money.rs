//! Integer minor-unit currency values.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A currency amount held as a whole number of minor units (cents).
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Converts a decimal amount, rounding half away from zero to two
    /// places. Returns `None` if the value does not fit.
    pub fn from_decimal(d: Decimal) -> Option<Self> {
        let rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        (rounded * Decimal::ONE_HUNDRED).to_i64().map(Cents)
    }

    pub fn abs(self) -> Self {
        Cents(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn parts(self) -> (i64, i64) {
        (self.0 / 100, self.0 % 100)
    }
}

impl fmt::Debug for Cents {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "Cents({})", self)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let sign = if self.0 < 0 { "-" } else { "" };
        let (units, minor) = self.abs().parts();
        write!(f, "{}{}.{:02}", sign, units, minor)
    }
}

impl Add for Cents {
    type Output = Cents;
    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0 + rhs.0)
    }
}

impl Sub for Cents {
    type Output = Cents;
    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0 - rhs.0)
    }
}

impl Neg for Cents {
    type Output = Cents;
    fn neg(self) -> Cents {
        Cents(-self.0)
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
        iter.fold(Cents::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Cents>>(iter: I) -> Cents {
        iter.copied().sum()
    }
}

impl Serialize for Cents {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cents {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(CentsVisitor)
    }
}

/// Accepts either a decimal string (`"16.41"`) or a whole number of cents.
struct CentsVisitor;

impl<'de> de::Visitor<'de> for CentsVisitor {
    type Value = Cents;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal amount string such as \"12.34\" or integer cents")
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
        let d: Decimal = s.trim().parse().map_err(de::Error::custom)?;
        if d.scale() > 2 && d != d.round_dp(2) {
            return Err(de::Error::custom(format!(
                "amount {:?} has more than two decimal places",
                s
            )));
        }
        Cents::from_decimal(d).ok_or_else(|| de::Error::custom("amount out of range"))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Cents(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(Cents)
            .map_err(|_| de::Error::custom("amount out of range"))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0 => "0.00")]
    #[test_case(12 => "0.12")]
    #[test_case(123 => "1.23")]
    #[test_case(1234 => "12.34")]
    #[test_case(-1234 => "-12.34")]
    #[test_case(-5 => "-0.05")]
    fn display(cents: i64) -> String {
        format!("{}", Cents(cents))
    }

    #[test_case(Decimal::new(1641, 2) => Some(Cents(1641)))]
    #[test_case(Decimal::new(-60, 2) => Some(Cents(-60)))]
    #[test_case(Decimal::new(16405, 3) => Some(Cents(1641)); "rounds half away from zero")]
    #[test_case(Decimal::new(7, 0) => Some(Cents(700)))]
    fn from_decimal(d: Decimal) -> Option<Cents> {
        Cents::from_decimal(d)
    }

    #[test]
    fn sums() {
        let amounts = vec![Cents(1399), Cents(60), Cents(182)];
        let total: Cents = amounts.iter().sum();
        assert_eq!(Cents(1641), total);
        assert_eq!(Cents(1641) - total, Cents::ZERO);
    }

    #[test]
    fn deserialize_json() {
        let got: Vec<Cents> = serde_json::from_str(r#"["16.41", "0.6", 250]"#).unwrap();
        assert_eq!(vec![Cents(1641), Cents(60), Cents(250)], got);
        assert!(serde_json::from_str::<Cents>(r#""1.234""#).is_err());
    }
}
