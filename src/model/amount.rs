//! Amount type for handling monetary values in rupees.
//!
//! This module provides the `Amount` type which wraps `Decimal`. Amounts arrive from the server as
//! JSON numbers or numeric strings, are written back as JSON numbers, and are displayed with the
//! Indian digit grouping, e.g. `₹12,34,567.50`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents how amounts were (or should be) formatted as text.
///
/// # Examples
///  - `AmountFormat{ rupee: true, grouping: true }` -> `-₹1,20,000.00`
///  - `AmountFormat{ rupee: false, grouping: true }` -> `-1,20,000.00`
///  - `AmountFormat{ rupee: false, grouping: false }` -> `-120000`
///  - `AmountFormat{ rupee: true, grouping: false }` -> `-₹120000`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// Whether a rupee sign is present in the formatting.
    rupee: bool,
    /// Whether digits are grouped (and two decimals shown).
    grouping: bool,
}

impl AmountFormat {
    pub const fn new(rupee: bool, grouping: bool) -> Self {
        Self { rupee, grouping }
    }
}

impl Default for AmountFormat {
    fn default() -> Self {
        DEFAULT_FORMAT
    }
}

/// The default format has a rupee sign and grouping: e.g. `₹1,20,000.00`.
const DEFAULT_FORMAT: AmountFormat = AmountFormat {
    rupee: true,
    grouping: true,
};

const RUPEE: char = '₹';

/// Represents an amount of money.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that. Values read from JSON always carry the
/// default format.
///
/// # Examples
///
/// ```
/// # use lendbook::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1234567.5").unwrap();
/// assert_eq!(amount.to_string(), "1234567.5");
/// assert_eq!(amount.with_format(Default::default()).to_string(), "₹12,34,567.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with default `String` formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: DEFAULT_FORMAT,
        }
    }

    /// Returns a copy of the amount that is displayed with `format`.
    pub const fn with_format(self, format: AmountFormat) -> Self {
        Self {
            value: self.value,
            format,
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.value().is_sign_negative() && !self.is_zero()
    }

    /// The value with trailing zeros removed, e.g. `100` for `100.00`.
    pub fn plain(&self) -> String {
        self.value.normalize().to_string()
    }

    /// The value with Indian digit grouping but without the rupee sign or forced decimals,
    /// e.g. `1,20,000` or `2,500.5`.
    pub fn grouped(&self) -> String {
        let normalized = self.value.normalize();
        let text = normalized.abs().to_string();
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i.to_string(), Some(f.to_string())),
            None => (text, None),
        };
        let sign = if self.is_negative() { "-" } else { "" };
        match frac_part {
            Some(frac) => format!("{sign}{}.{frac}", group_indian(&int_part)),
            None => format!("{sign}{}", group_indian(&int_part)),
        }
    }
}

/// Groups the digits of an unsigned integer string the Indian way: the last three digits, then
/// pairs. `1234567` becomes `12,34,567`.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

/// An error that can occur when parsing strings into `Decimal` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let (rupee, digits) = match unsigned.strip_prefix(RUPEE) {
            Some(rest) => (true, rest.trim_start()),
            None => (false, unsigned),
        };

        let without_commas = digits.replace(',', "");
        let grouping = without_commas.len() < digits.len();

        let mut value = Decimal::from_str(&without_commas)
            .or_else(|_| Decimal::from_scientific(&without_commas))
            .map_err(AmountError)?;
        if negative {
            value = -value;
        }
        Ok(Amount {
            value,
            format: AmountFormat { rupee, grouping },
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let rupee = if self.format.rupee { "₹" } else { "" };

        if self.format.grouping {
            let rounded = format!("{:.2}", self.value().abs().round_dp(2));
            let (int_part, frac_part) = rounded.split_once('.').unwrap_or((&rounded, "00"));
            write!(f, "{sign}{rupee}{}.{frac_part}", group_indian(int_part))
        } else {
            write!(f, "{sign}{rupee}{}", self.value().abs().normalize())
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Integral values are written as JSON integers so that `100` stays `100`.
        let value = self.value();
        if value.fract().is_zero() {
            if let Some(i) = value.to_i64() {
                return serializer.serialize_i64(i);
            }
        }
        match value.to_f64() {
            Some(f) => serializer.serialize_f64(f),
            None => Err(serde::ser::Error::custom(format!(
                "amount {value} cannot be written as a number"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(serde_json::Number),
            Text(String),
        }

        let parsed = match Wire::deserialize(deserializer)? {
            Wire::Number(n) => Amount::from_str(&n.to_string()),
            Wire::Text(s) => Amount::from_str(&s),
        };
        parsed
            .map(|a| a.with_format(DEFAULT_FORMAT))
            .map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::new(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        Amount::new(iter.map(|a| a.value()).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_with_rupee_sign() {
        let amount = Amount::from_str("₹50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
        assert_eq!(amount.to_string(), "₹50");
    }

    #[test]
    fn test_parse_negative_with_grouping() {
        let amount = Amount::from_str("-₹1,20,000.00").unwrap();
        assert_eq!(amount.value(), dec("-120000"));
        assert_eq!(amount.to_string(), "-₹1,20,000.00");
    }

    #[test]
    fn test_parse_empty_string() {
        assert_eq!(Amount::from_str("  ").unwrap().value(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("twelve").is_err());
        assert!(Amount::from_str("12abc").is_err());
    }

    #[test]
    fn test_display_default_format() {
        let cases = [
            ("0", "₹0.00"),
            ("5", "₹5.00"),
            ("999.999", "₹1,000.00"),
            ("1000", "₹1,000.00"),
            ("100000", "₹1,00,000.00"),
            ("1234567.5", "₹12,34,567.50"),
            ("-2500.25", "-₹2,500.25"),
        ];
        for (input, expected) in cases {
            assert_eq!(Amount::new(dec(input)).to_string(), expected, "{input}");
        }
    }

    #[test]
    fn test_grouped_and_plain() {
        let amount = Amount::new(dec("120000.50"));
        assert_eq!(amount.grouped(), "1,20,000.5");
        assert_eq!(amount.plain(), "120000.5");
        assert_eq!(Amount::new(dec("100.00")).plain(), "100");
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&Amount::from(100i64)).unwrap(), "100");
        assert_eq!(
            serde_json::to_string(&Amount::new(dec("2.5"))).unwrap(),
            "2.5"
        );
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let a: Amount = serde_json::from_str("1500").unwrap();
        let b: Amount = serde_json::from_str("\"1500.00\"").unwrap();
        let c: Amount = serde_json::from_str("1.5e3").unwrap();
        assert_eq!(a.value(), b.value());
        assert_eq!(a.value(), c.value());
        assert_eq!(a, b);
        assert!(serde_json::from_str::<Amount>("\"-\"").is_err());
    }

    #[test]
    fn test_equality_includes_format() {
        let a1 = Amount::from_str("₹50.00").unwrap();
        let a2 = Amount::from_str("50.00").unwrap();
        assert_ne!(a1, a2);
        assert_eq!(a1.value(), a2.value());
    }

    #[test]
    fn test_sum() {
        let total: Amount = [Amount::from(10i64), Amount::new(dec("2.5"))].into_iter().sum();
        assert_eq!(total.value(), dec("12.5"));
    }
}
