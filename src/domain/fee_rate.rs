//! Swap fee expressed as an exact rational.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AmmError;

/// The fraction of every swap input retained by the pool.
///
/// Stored as `numerator / denominator` rather than basis points so that
/// the constant-product check `balance·D − amountIn·N` stays exact.
///
/// # Examples
///
/// ```
/// use pairswap::domain::FeeRate;
///
/// let fee = FeeRate::THIRTY_BPS;
/// assert_eq!(fee.numerator(), 3);
/// assert_eq!(fee.denominator(), 1_000);
/// assert_eq!(fee.complement(), 997);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeRate {
    numerator: u32,
    denominator: u32,
}

impl FeeRate {
    /// 0.30%, the canonical constant-product fee.
    pub const THIRTY_BPS: Self = Self {
        numerator: 3,
        denominator: 1_000,
    };

    /// Creates a fee rate of `numerator / denominator`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] if the denominator is
    /// zero or the fee is 100% or more.
    pub const fn new(numerator: u32, denominator: u32) -> Result<Self, AmmError> {
        if denominator == 0 {
            return Err(AmmError::InvalidConfiguration("fee denominator is zero"));
        }
        if numerator >= denominator {
            return Err(AmmError::InvalidConfiguration("fee must be below 100%"));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Fee numerator `N`.
    #[must_use]
    pub const fn numerator(&self) -> u32 {
        self.numerator
    }

    /// Fee denominator `D`.
    #[must_use]
    pub const fn denominator(&self) -> u32 {
        self.denominator
    }

    /// `D − N`: the share of each input unit that reaches the pricing curve.
    #[must_use]
    pub const fn complement(&self) -> u32 {
        self.denominator - self.numerator
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::THIRTY_BPS
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_is_thirty_bps() {
        assert_eq!(FeeRate::default(), FeeRate::THIRTY_BPS);
        assert_eq!(FeeRate::default().to_string(), "3/1000");
    }

    #[test]
    fn zero_fee_is_allowed() {
        let Ok(fee) = FeeRate::new(0, 1_000) else {
            panic!("zero fee is a valid rate");
        };
        assert_eq!(fee.complement(), 1_000);
    }

    #[test]
    fn rejects_degenerate_rates() {
        assert!(matches!(
            FeeRate::new(1, 0),
            Err(AmmError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            FeeRate::new(1_000, 1_000),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }
}
