//! Type-safe price representation.
//!
//! The backend stores every amount in minor currency units (paise). Product
//! prices, cart lines, cart totals, and order totals all use [`Price`], so a
//! value is divided by 100 exactly once: when it is displayed.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// An amount of money in minor currency units.
///
/// Serializes as a bare JSON integer. Deserializes from an integer, or from a
/// float which is rounded to the nearest minor unit.
///
/// # Example
///
/// ```rust
/// use tryla_core::Price;
///
/// let price = Price::from_minor(49_900);
/// assert_eq!(price.to_string(), "₹499.00");
/// assert_eq!((price * 2).minor_units(), 99_800);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Create a price from minor units (paise).
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Amount in major units (rupees) as an exact decimal.
    #[must_use]
    pub fn major_units(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Parse a major-unit amount typed by a person (e.g. `"499.50"`).
    ///
    /// Amounts with more than two decimal places are rounded half-away-from-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal number or does not fit
    /// in minor units.
    pub fn parse_major(input: &str) -> Result<Self, PriceParseError> {
        let amount: Decimal = input
            .trim()
            .parse()
            .map_err(|_| PriceParseError::Invalid(input.to_owned()))?;
        let minor = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| PriceParseError::OutOfRange(input.to_owned()))?
            .round();
        i64::try_from(minor)
            .map(Self)
            .map_err(|_| PriceParseError::OutOfRange(input.to_owned()))
    }
}

/// Errors that can occur when parsing a [`Price`] from text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceParseError {
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The input does not fit in minor units.
    #[error("price out of range: {0}")]
    OutOfRange(String),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{:.2}", self.major_units())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PriceVisitor;

        impl Visitor<'_> for PriceVisitor {
            type Value = Price;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an amount in minor currency units")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Price(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .map(Price)
                    .map_err(|_| E::custom(format!("price out of range: {v}")))
            }

            #[allow(clippy::cast_possible_truncation)] // bounds checked above the cast
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                let rounded = v.round();
                if !rounded.is_finite() || rounded.abs() > 9.0e15 {
                    return Err(E::custom(format!("price out of range: {v}")));
                }
                Ok(Price(rounded as i64))
            }
        }

        deserializer.deserialize_any(PriceVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_divides_by_hundred() {
        assert_eq!(Price::from_minor(499).to_string(), "₹4.99");
        assert_eq!(Price::from_minor(100_000).to_string(), "₹1000.00");
        assert_eq!(Price::ZERO.to_string(), "₹0.00");
    }

    #[test]
    fn test_line_total_and_sum() {
        let total: Price = [Price::from_minor(499) * 2, Price::from_minor(1) * 3]
            .into_iter()
            .sum();
        assert_eq!(total.minor_units(), 1001);
    }

    #[test]
    fn test_deserialize_integer_and_float() {
        let p: Price = serde_json::from_str("499").unwrap();
        assert_eq!(p.minor_units(), 499);

        let p: Price = serde_json::from_str("499.6").unwrap();
        assert_eq!(p.minor_units(), 500);
    }

    #[test]
    fn test_deserialize_rejects_string() {
        assert!(serde_json::from_str::<Price>("\"499\"").is_err());
    }

    #[test]
    fn test_parse_major() {
        assert_eq!(Price::parse_major("499.50").unwrap().minor_units(), 49_950);
        assert_eq!(Price::parse_major(" 12 ").unwrap().minor_units(), 1200);
        assert!(matches!(
            Price::parse_major("twelve"),
            Err(PriceParseError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_major_out_of_range() {
        assert!(matches!(
            Price::parse_major("79228162514264337593543950335"),
            Err(PriceParseError::OutOfRange(_))
        ));
        assert!(matches!(
            Price::parse_major("100000000000000000000"),
            Err(PriceParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_negative_is_not_rejected() {
        // No business rule on sign; the backend decides.
        assert_eq!(Price::parse_major("-1").unwrap().minor_units(), -100);
    }
}
