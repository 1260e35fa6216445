//! Money values exchanged with the backend.
//!
//! Amounts arrive as decimal strings ("6500.00"), bare integers (teacher pay) or
//! occasionally floats. Everything funnels through [`Money::parse_or_zero`] so that
//! blank or malformed input counts as zero instead of failing a whole listing.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Parse user or backend text; blank and non-numeric input is zero.
    pub fn parse_or_zero(input: &str) -> Self {
        Self::parse(input).unwrap_or(Money::ZERO)
    }

    /// Strict parse, used for filter bounds where a typo should be reported.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()
            .map(Money)
    }

    pub fn from_f64(value: f64) -> Self {
        Decimal::from_f64(value).map(Money).unwrap_or(Money::ZERO)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The amount as an integer, if it has no fractional part.
    pub fn whole(&self) -> Option<i64> {
        if self.0.fract().is_zero() {
            self.0.to_i64()
        } else {
            None
        }
    }

    /// Rounded to cents, midpoint away from zero.
    pub fn round_cents(&self) -> Money {
        Money(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn max(self, other: Money) -> Money {
        if self >= other {
            self
        } else {
            other
        }
    }

    /// Two decimals with thousands separators, e.g. `350,000.00`.
    pub fn grouped(&self) -> String {
        let plain = self.to_string();
        let (whole, frac) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
        let negative = whole.starts_with('-');
        let digits = whole.trim_start_matches('-');

        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        let grouped: String = out.chars().rev().collect();

        if negative {
            format!("-{grouped}.{frac}")
        } else {
            format!("{grouped}.{frac}")
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rounded = self.round_cents().0;
        rounded.rescale(2);
        write!(f, "{rounded}")
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Money(Decimal::from(value))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Ok(Money::parse_or_zero(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Ok(Money::from_f64(v))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Money, E> {
        Ok(Money::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::ZERO)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Money, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_garbage_are_zero() {
        assert_eq!(Money::parse_or_zero(""), Money::ZERO);
        assert_eq!(Money::parse_or_zero("   "), Money::ZERO);
        assert_eq!(Money::parse_or_zero("abc"), Money::ZERO);
        assert_eq!(Money::parse_or_zero("25.5").to_string(), "25.50");
    }

    #[test]
    fn whole_amounts_only() {
        assert_eq!(Money::parse_or_zero("45000.00").whole(), Some(45000));
        assert_eq!(Money::parse_or_zero("45000.50").whole(), None);
    }

    #[test]
    fn display_always_has_two_decimals() {
        assert_eq!(Money::from(100).to_string(), "100.00");
        assert_eq!(Money::parse_or_zero("0.125").to_string(), "0.13");
        assert_eq!(Money::parse_or_zero("-3.5").to_string(), "-3.50");
    }

    #[test]
    fn grouped_inserts_separators() {
        assert_eq!(Money::from(350000).grouped(), "350,000.00");
        assert_eq!(Money::parse_or_zero("-1234.5").grouped(), "-1,234.50");
        assert_eq!(Money::from(12).grouped(), "12.00");
    }

    #[test]
    fn deserializes_strings_numbers_and_null() {
        let values: Vec<Money> =
            serde_json::from_str(r#"["6500.00", 90000, 12.5, null, ""]"#).unwrap();
        let rendered: Vec<String> = values.iter().map(|m| m.to_string()).collect();
        assert_eq!(rendered, ["6500.00", "90000.00", "12.50", "0.00", "0.00"]);
    }

    #[test]
    fn serializes_as_cent_string() {
        let json = serde_json::to_string(&Money::from(42)).unwrap();
        assert_eq!(json, "\"42.00\"");
    }
}
