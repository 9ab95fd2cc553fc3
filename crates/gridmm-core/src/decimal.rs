//! Exact-decimal price and size newtypes.
//!
//! Grid placement is lattice arithmetic: every order price must land on
//! an exact multiple of the configured step, and binary floats cannot
//! represent most of those multiples. Both wrappers keep `rust_decimal`
//! underneath and exist so the compiler rejects a size where a price
//! belongs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use crate::error::CoreError;

/// A price in quote currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Strictly greater than zero; a zero reference price is as useless
    /// as a missing one.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Snap down to the nearest multiple of `step`.
    #[inline]
    pub fn floor_to_step(&self, step: Decimal) -> Self {
        if step.is_zero() {
            return *self;
        }
        Self((self.0 / step).floor() * step)
    }

    /// Snap up to the nearest multiple of `step`.
    #[inline]
    pub fn ceil_to_step(&self, step: Decimal) -> Self {
        if step.is_zero() {
            return *self;
        }
        Self((self.0 / step).ceil() * step)
    }

    /// Drop fractional digits beyond `scale` without rounding.
    ///
    /// Used to normalize exchange-reported prices onto the grid's
    /// decimal domain before set comparisons.
    #[inline]
    pub fn truncate_scale(&self, scale: u32) -> Self {
        Self(self.0.trunc_with_scale(scale))
    }

    /// Absolute distance to another price.
    #[inline]
    pub fn distance(&self, other: Price) -> Decimal {
        (self.0 - other.0).abs()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Price {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse::<Decimal>()?))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// A quantity in base currency.
///
/// Carried as an absolute magnitude; direction lives in
/// `PositionSide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[inline]
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Round down to a whole number of lots. Anything smaller than one
    /// lot rounds to zero.
    #[inline]
    pub fn round_to_lot(&self, lot: Decimal) -> Self {
        if lot.is_zero() {
            return *self;
        }
        Self((self.0 / lot).floor() * lot)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Size {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse::<Decimal>()?))
    }
}

impl Mul<Decimal> for Size {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}
