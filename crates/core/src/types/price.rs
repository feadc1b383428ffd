//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a listing [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price is required")]
    Empty,
    #[error("price must be a number")]
    NotANumber,
    #[error("price must be greater than 0")]
    NotPositive,
    #[error("price must be at most {}", Price::MAX_LISTING)]
    TooLarge,
}

/// An amount in the marketplace currency (US dollars).
///
/// Stored with at most two decimal places. Listing prices are strictly
/// positive and capped at [`Price::MAX_LISTING`]; cart and purchase totals
/// may be zero. Arithmetic saturates instead of overflowing, so a bad blob
/// on disk can never panic a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Highest price a listing may ask ($1,000,000.00).
    pub const MAX_LISTING: Self = Self(Decimal::from_parts(100_000_000, 0, 0, false, 2));

    /// Create a price from a decimal amount, rounded to cents.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Parse a listing price entered in a form (e.g. `"85"`, `"19.99"`, `"$12"`).
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Empty`] for blank input, [`PriceError::NotANumber`]
    /// if the input is not a decimal number, [`PriceError::NotPositive`]
    /// for zero or negative amounts and [`PriceError::TooLarge`] above
    /// [`Price::MAX_LISTING`].
    pub fn parse_listing(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }
        let amount = Decimal::from_str(trimmed).map_err(|_| PriceError::NotANumber)?;
        let price = Self::new(amount);
        if price.0 <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        if price > Self::MAX_LISTING {
            return Err(PriceError::TooLarge);
        }
        Ok(price)
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Plain amount for form inputs, e.g. `"19.99"` or `"85"`.
    #[must_use]
    pub fn to_input_value(&self) -> String {
        self.0.normalize().to_string()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
