//! Current-year / prior-year amount pair with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary figure reported for the current and the prior year.
///
/// Every statement line carries both columns; arithmetic is applied to
/// the two columns independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearAmounts {
    /// Current-year amount.
    pub cy: Decimal,
    /// Prior-year amount.
    pub py: Decimal,
}

impl YearAmounts {
    /// Both columns zero.
    pub const ZERO: Self = Self {
        cy: Decimal::ZERO,
        py: Decimal::ZERO,
    };

    /// Creates a new pair.
    #[must_use]
    pub const fn new(cy: Decimal, py: Decimal) -> Self {
        Self { cy, py }
    }

    /// Returns true if both columns are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.cy.is_zero() && self.py.is_zero()
    }

    /// Applies a percentage (0-100 scale) to both columns.
    #[must_use]
    pub fn percent_of(self, pct: Decimal) -> Self {
        Self {
            cy: self.cy * pct / Decimal::ONE_HUNDRED,
            py: self.py * pct / Decimal::ONE_HUNDRED,
        }
    }

    /// Absolute value of both columns.
    #[must_use]
    pub fn abs(self) -> Self {
        Self {
            cy: self.cy.abs(),
            py: self.py.abs(),
        }
    }
}

impl Add for YearAmounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cy: self.cy + rhs.cy,
            py: self.py + rhs.py,
        }
    }
}

impl AddAssign for YearAmounts {
    fn add_assign(&mut self, rhs: Self) {
        self.cy += rhs.cy;
        self.py += rhs.py;
    }
}

impl Sub for YearAmounts {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            cy: self.cy - rhs.cy,
            py: self.py - rhs.py,
        }
    }
}

impl SubAssign for YearAmounts {
    fn sub_assign(&mut self, rhs: Self) {
        self.cy -= rhs.cy;
        self.py -= rhs.py;
    }
}

impl Neg for YearAmounts {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            cy: -self.cy,
            py: -self.py,
        }
    }
}

impl std::iter::Sum for YearAmounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
