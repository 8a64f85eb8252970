//! Amount type for monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles
//! values that may or may not be written in the Indonesian Rupiah style,
//! e.g. `Rp 1.000.000` or `1.000.000,50`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents how an amount was (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ rupiah: true, separators: true }` -> `Rp 1.000.000`
///  - `AmountFormat{ rupiah: true, separators: false }` -> `Rp 1000000`
///  - `AmountFormat{ rupiah: false, separators: true }` -> `1.000.000`
///  - `AmountFormat{ rupiah: false, separators: false }` -> `1000000`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// Whether an `Rp` prefix is present in the formatting.
    rupiah: bool,
    /// Whether dots are present as thousands separators in the formatting.
    separators: bool,
}

impl Default for AmountFormat {
    fn default() -> Self {
        PLAIN_FORMAT
    }
}

/// The default format is a bare decimal, which is also the wire format of the
/// hosted store's `numeric` columns.
const PLAIN_FORMAT: AmountFormat = AmountFormat {
    rupiah: false,
    separators: false,
};

/// Represents a monetary amount.
///
/// This type wraps `Decimal` and provides custom serialization and
/// deserialization: the hosted store returns `numeric` columns as JSON
/// numbers, while user input may carry an `Rp` prefix and id-ID digit
/// grouping (dots for thousands, comma for decimals).
///
/// Formatting is significant for equality; for numeric comparisons use the
/// `Decimal` from `value()`.
///
/// # Examples
///
/// ```
/// # use saldo::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("Rp 1.000.000").unwrap();
/// assert_eq!(amount.to_string(), "Rp 1.000.000");
///
/// let plain = Amount::from_str("1000000").unwrap();
/// assert_ne!(amount, plain);
/// assert_eq!(amount.value(), plain.value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with plain formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: PLAIN_FORMAT,
        }
    }

    /// Creates a new Amount from a Decimal value with the specified formatting.
    pub const fn new_with_format(value: Decimal, format: AmountFormat) -> Self {
        Self { value, format }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.value().is_sign_negative()
    }

    /// Renders the amount the way the app displays money, regardless of how
    /// the value was originally written: `Rp` prefix and id-ID grouping.
    pub fn rupiah(&self) -> String {
        format!("Rp {}", group_id(self.value))
    }
}

/// Formats a decimal with id-ID digit grouping: dots between thousands groups
/// and a comma before any fractional digits.
pub(crate) fn group_id(value: Decimal) -> String {
    let grouped = if value.fract().is_zero() {
        format_num::format_num!(",.0", value.to_f64().unwrap_or_default())
    } else {
        format_num::format_num!(",.2", value.to_f64().unwrap_or_default())
    };
    // format_num produces en-US grouping; id-ID swaps the two separators.
    grouped
        .chars()
        .map(|c| match c {
            ',' => '.',
            '.' => ',',
            other => other,
        })
        .collect()
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

        // Handle empty string
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // Remove the Rp prefix if present
        let (rupiah, rest) = match trimmed.strip_prefix("Rp") {
            Some(after) => (true, after.trim_start()),
            None => (false, trimmed),
        };

        // Dots are thousands separators when the Rp prefix is present or a
        // decimal comma is used; otherwise a dot is a plain decimal point.
        let id_style = rupiah || rest.contains(',');
        let normalized = if id_style {
            rest.replace('.', "").replace(',', ".")
        } else {
            rest.to_string()
        };
        let separators = normalized.len() < rest.len();

        let value = Decimal::from_str(&normalized).map_err(AmountError)?;
        Ok(Amount {
            value,
            format: AmountFormat { rupiah, separators },
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.format.rupiah { "Rp " } else { "" };
        if self.format.separators {
            write!(f, "{prefix}{}", group_id(self.value))
        } else {
            write!(f, "{prefix}{}", self.value)
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // The store's numeric columns accept a bare decimal string.
        serializer.serialize_str(&self.value.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// The store returns `numeric` columns as JSON numbers; CLI round-trips and
/// seed data use strings. Accept all of them.
struct AmountVisitor;

impl serde::de::Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("a decimal number or a formatted amount string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Amount::from_str(v).map_err(serde::de::Error::custom)
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Decimal::try_from(v)
            .map(Amount::new)
            .map_err(serde::de::Error::custom)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Amount::new(Decimal::from(v)))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
