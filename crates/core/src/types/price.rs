//! Type-safe unit prices using decimal arithmetic.
//!
//! Prices are stored in the currency's standard unit (dollars, not cents) and
//! travel over JSON as plain numbers, because that is what the browser cart
//! has always written to storage. Conversion to the payment provider's minor
//! units happens only at checkout via [`Price::to_minor_units`].

use core::fmt;
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when coercing a value into a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input could not be read as a number.
    #[error("price is not a number: {0:?}")]
    NotANumber(String),
    /// The input was NaN or infinite.
    #[error("price must be a finite number")]
    NotFinite,
    /// The input was below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A non-negative unit price.
///
/// ## Examples
///
/// ```
/// use alyssa_loops_core::Price;
///
/// let price = Price::parse(" 12.5 ").unwrap();
/// assert_eq!(price.to_string(), "12.5");
/// assert_eq!(price.to_minor_units(), Some(1250));
/// assert!(Price::parse("abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount.normalize()))
    }

    /// Coerce a float into a price.
    ///
    /// # Errors
    ///
    /// Returns an error for NaN, infinities and negative values.
    pub fn from_f64(value: f64) -> Result<Self, PriceError> {
        if !value.is_finite() {
            return Err(PriceError::NotFinite);
        }
        let amount = Decimal::from_f64(value).ok_or(PriceError::NotFinite)?;
        Self::new(amount)
    }

    /// Coerce a string (such as a `data-price` attribute) into a price.
    ///
    /// Surrounding whitespace is ignored and scientific notation is accepted.
    /// An empty string is rejected rather than read as zero, as are digit
    /// separators (`1_000`).
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is not a finite, non-negative number.
    pub fn parse(raw: &str) -> Result<Self, PriceError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.contains('_') {
            return Err(PriceError::NotANumber(raw.to_string()));
        }

        let lowered = trimmed.to_ascii_lowercase();
        if matches!(
            lowered.trim_start_matches(['+', '-']),
            "nan" | "inf" | "infinity"
        ) {
            return Err(PriceError::NotFinite);
        }

        let amount = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| PriceError::NotANumber(raw.to_string()))?;
        Self::new(amount)
    }

    /// The decimal amount in standard currency units.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units at this price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }

    /// The amount in minor units (cents), rounded half away from zero.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    #[must_use]
    pub fn to_minor_units(&self) -> Option<i64> {
        (self.0 * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

/// Format an amount as whole dollars, e.g. `$25`.
///
/// This is how the cart drawer shows prices and totals.
#[must_use]
pub fn format_whole_dollars(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("${}", rounded.normalize())
}

/// Format an amount given in minor units with two decimals, e.g. `$45.00`.
#[must_use]
pub fn format_minor_units(minor: i64) -> String {
    format!("${}", Decimal::new(minor, 2))
}
