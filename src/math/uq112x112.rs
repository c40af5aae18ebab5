//! Unsigned 112.112 fixed point and wrapping price accumulators.
//!
//! A reserve ratio `reserve_b / reserve_a` is encoded as
//! `(reserve_b << 112) / reserve_a`.  With both reserves bounded by
//! [`MAX_RESERVE`], the encoding needs at most 224 bits and loses no
//! integer precision.
//!
//! Accumulators integrate that ratio over seconds.  They are designed to
//! overflow: every operation on [`PriceCumulative`] wraps modulo `2^256`,
//! and consumers only ever difference two readings, which remains exact
//! as long as the true difference fits in 256 bits.

use core::fmt;

use super::wide::{narrow, U256, MAX_RESERVE};
use crate::domain::Amount;
use crate::error::AmmError;

/// Number of fractional bits.
pub const RESOLUTION: usize = 112;

/// Unsigned fixed-point number with 112 integer and 112 fractional bits.
///
/// # Examples
///
/// ```
/// use pairswap::domain::Amount;
/// use pairswap::math::Uq112x112;
///
/// // 40 000 / 10 000 = 4.0
/// let price = Uq112x112::from_ratio(Amount::new(40_000), Amount::new(10_000)).expect("ratio");
/// assert_eq!(price.mul_amount(Amount::new(25)).expect("fits"), Amount::new(100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Uq112x112(U256);

impl Uq112x112 {
    /// Encodes an integer as fixed point.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if `value` exceeds 112 bits.
    pub fn encode(value: u128) -> Result<Self, AmmError> {
        if value > MAX_RESERVE {
            return Err(AmmError::Overflow("uq112x112 encode exceeds 112 bits"));
        }
        Ok(Self(U256::from(value) << RESOLUTION))
    }

    /// Divides by an integer, truncating.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `divisor` is zero.
    pub fn uqdiv(self, divisor: u128) -> Result<Self, AmmError> {
        if divisor == 0 {
            return Err(AmmError::DivisionByZero);
        }
        Ok(Self(self.0 / U256::from(divisor)))
    }

    /// `numerator / denominator` as fixed point.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Overflow`] if `numerator` exceeds 112 bits.
    /// - [`AmmError::DivisionByZero`] if `denominator` is zero.
    pub fn from_ratio(numerator: Amount, denominator: Amount) -> Result<Self, AmmError> {
        Self::encode(numerator.get())?.uqdiv(denominator.get())
    }

    /// Wraps a raw 256-bit representation.
    #[must_use]
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Returns the raw 256-bit representation.
    #[must_use]
    pub const fn raw(&self) -> U256 {
        self.0
    }

    /// Integer part, truncating the fraction.
    #[must_use]
    pub fn decode(&self) -> U256 {
        self.0 >> RESOLUTION
    }

    /// Multiplies by a token amount and truncates to an integer amount.
    ///
    /// This is how a time-weighted average price converts an input
    /// quantity of one token into the other.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the product or result overflows.
    pub fn mul_amount(&self, amount: Amount) -> Result<Amount, AmmError> {
        let product = self
            .0
            .checked_mul(U256::from(amount.get()))
            .ok_or(AmmError::Overflow("uq112x112 multiplication overflow"))?;
        narrow(product >> RESOLUTION, "uq112x112 product exceeds u128").map(Amount::new)
    }
}

impl fmt::Display for Uq112x112 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Six decimal places are enough for logs; the raw value is exact.
        let scaled = (self.0.saturating_mul(U256::from(1_000_000u64))) >> RESOLUTION;
        let int = scaled / U256::from(1_000_000u64);
        let frac = (scaled % U256::from(1_000_000u64)).low_u64();
        write!(f, "{int}.{frac:06}")
    }
}

/// A price integrated over seconds, wrapping modulo `2^256`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PriceCumulative(U256);

impl PriceCumulative {
    /// A fresh accumulator.
    pub const ZERO: Self = Self(U256([0; 4]));

    /// Wraps a raw accumulator reading.
    #[must_use]
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Returns the raw accumulator reading.
    #[must_use]
    pub const fn raw(&self) -> U256 {
        self.0
    }

    /// Adds `price × elapsed`, wrapping on overflow.
    #[must_use]
    pub fn accrue(self, price: Uq112x112, elapsed: u64) -> Self {
        let (increment, _) = price.raw().overflowing_mul(U256::from(elapsed));
        let (next, _) = self.0.overflowing_add(increment);
        Self(next)
    }

    /// Average price between an `earlier` reading and this one.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `elapsed` is zero.
    pub fn average_since(&self, earlier: &Self, elapsed: u64) -> Result<Uq112x112, AmmError> {
        if elapsed == 0 {
            return Err(AmmError::DivisionByZero);
        }
        let (delta, _) = self.0.overflowing_sub(earlier.0);
        Ok(Uq112x112(delta / U256::from(elapsed)))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn ratio(n: u128, d: u128) -> Uq112x112 {
        let Ok(p) = Uq112x112::from_ratio(Amount::new(n), Amount::new(d)) else {
            panic!("valid ratio");
        };
        p
    }

    #[test]
    fn encode_integer() {
        let Ok(two) = Uq112x112::encode(2) else {
            panic!("encodes");
        };
        assert_eq!(two.decode(), U256::from(2u64));
    }

    #[test]
    fn encode_rejects_wide_values() {
        assert!(matches!(
            Uq112x112::encode(MAX_RESERVE + 1),
            Err(AmmError::Overflow(_))
        ));
    }

    #[test]
    fn ratio_keeps_fraction() {
        let half = ratio(1, 2);
        assert_eq!(half.decode(), U256::zero());
        assert_eq!(half.raw(), U256::one() << (RESOLUTION - 1));
        assert_eq!(half.to_string(), "0.500000");
    }

    #[test]
    fn uqdiv_by_zero() {
        let Ok(one) = Uq112x112::encode(1) else {
            panic!("encodes");
        };
        assert_eq!(one.uqdiv(0), Err(AmmError::DivisionByZero));
    }

    #[test]
    fn mul_amount_truncates() {
        let third = ratio(1, 3);
        assert_eq!(third.mul_amount(Amount::new(10)), Ok(Amount::new(3)));
    }

    #[test]
    fn accumulator_integrates_over_time() {
        let price = ratio(4, 1);
        let acc = PriceCumulative::ZERO.accrue(price, 10);
        let Ok(avg) = acc.average_since(&PriceCumulative::ZERO, 10) else {
            panic!("non-zero elapsed");
        };
        assert_eq!(avg, price);
    }

    #[test]
    fn accumulator_wraps_and_still_differences_exactly() {
        let price = ratio(3, 1);
        let near_max = PriceCumulative::from_raw(U256::MAX - U256::from(5u64));
        let later = near_max.accrue(price, 7);
        assert!(later.raw() < near_max.raw(), "accumulator should have wrapped");
        let Ok(avg) = later.average_since(&near_max, 7) else {
            panic!("non-zero elapsed");
        };
        assert_eq!(avg, price);
    }

    #[test]
    fn average_over_zero_time_is_rejected() {
        assert_eq!(
            PriceCumulative::ZERO.average_since(&PriceCumulative::ZERO, 0),
            Err(AmmError::DivisionByZero)
        );
    }
}
