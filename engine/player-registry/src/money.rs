//! Money type for squad budget arithmetic

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Money represents a price or bank balance in tenths of a million
///
/// This is the league's native unit: a player listed at £5.5m is stored as 55.
/// Arithmetic saturates at the `i64` bounds, so extreme snapshot prices
/// clamp instead of overflowing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money {
    /// Amount in tenths of a million
    pub tenths: i64,
}

impl Money {
    pub const ZERO: Money = Money { tenths: 0 };

    /// Create an amount from tenths of a million
    pub const fn from_tenths(tenths: i64) -> Self {
        Self { tenths }
    }

    /// Create an amount from millions, rounding to the nearest tenth
    pub fn from_millions(millions: f64) -> Self {
        Self { tenths: (millions * 10.0).round() as i64 }
    }

    /// Get the value in tenths of a million
    pub fn to_tenths(self) -> i64 {
        self.tenths
    }

    /// Get the value in millions
    pub fn to_millions(self) -> f64 {
        self.tenths as f64 / 10.0
    }

    pub fn is_zero(self) -> bool {
        self.tenths == 0
    }

    pub fn is_negative(self) -> bool {
        self.tenths < 0
    }

    /// Subtraction that floors at zero
    pub fn saturating_sub(self, other: Self) -> Self {
        Self { tenths: self.tenths.saturating_sub(other.tenths).max(0) }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self { tenths: self.tenths.saturating_add(other.tenths) }
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.tenths = self.tenths.saturating_add(other.tenths);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self { tenths: self.tenths.saturating_sub(other.tenths) }
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.tenths = self.tenths.saturating_sub(other.tenths);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self { tenths: self.tenths.saturating_neg() }
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.tenths < 0 { "-" } else { "" };
        let abs = self.tenths.unsigned_abs();
        write!(f, "{sign}£{}.{}m", abs / 10, abs % 10)
    }
}
