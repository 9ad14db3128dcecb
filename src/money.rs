//! Exact decimal money.
//!
//! Amounts are base-10 scaled integers (`rust_decimal::Decimal`), never binary floats.
//! On the wire and in logs a `Money` is always a fixed-point string such as `"19.99"`.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Mul},
    str::FromStr,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Digits after the decimal point of the currency's minor unit.
pub const MINOR_UNIT_SCALE: u32 = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid decimal `{0}`")]
    InvalidDecimal(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// `from_minor(1999)` is `19.99`.
    pub fn from_minor(minor: i64) -> Self {
        Money(Decimal::new(minor, MINOR_UNIT_SCALE))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Extends a unit price by a line quantity.
    pub fn times(self, quantity: i32) -> Money {
        Money(self.0 * Decimal::from(quantity))
    }

    /// Applies a rate such as `0.10` for a ten percent tax.
    pub fn apply_rate(self, rate: Decimal) -> Money {
        Money(self.0 * rate)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.contains(['e', 'E']) {
            return Err(MoneyError::InvalidDecimal(text.to_string()));
        }
        Decimal::from_str_exact(trimmed)
            .map(Money)
            .map_err(|_| MoneyError::InvalidDecimal(text.to_string()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self.0.normalize();
        if amount.scale() < MINOR_UNIT_SCALE {
            amount.rescale(MINOR_UNIT_SCALE);
        }
        write!(f, "{amount}")
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

impl Mul for Money {
    type Output = Money;

    fn mul(self, rhs: Money) -> Money {
        Money(self.0 * rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
