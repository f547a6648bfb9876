//! Monetary amounts as Clover reports them.

use serde::{Deserialize, Serialize};

/// An amount in integer minor units (cents), as returned by Clover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    /// Wraps a raw minor-unit amount.
    #[inline]
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw minor-unit amount.
    #[inline]
    #[must_use]
    pub const fn as_minor(self) -> i64 {
        self.0
    }

    /// Converts to decimal currency units (`250` cents becomes `2.5`).
    #[inline]
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        reason = "menu prices are far below 2^53 cents"
    )]
    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl From<i64> for Cents {
    #[inline]
    fn from(value: i64) -> Self {
        Self(value)
    }
}
