//! 256-bit intermediates for products that outgrow `u128`.
//!
//! Reserve products, `amount × total_shares` and the fee-scaled
//! constant-product check can all exceed 128 bits.  Every such
//! computation widens to [`U256`], and narrows back through
//! [`narrow`], which reports overflow instead of truncating.

use uint::construct_uint;

use crate::domain::Rounding;
use crate::error::AmmError;

construct_uint! {
    /// Unsigned 256-bit integer for overflow-free intermediate math.
    pub struct U256(4);
}

/// Largest reserve a pool may commit: `2^112 − 1`.
///
/// Keeping reserves within 112 bits lets a price ratio be encoded as
/// 112.112 fixed point without loss and keeps `reserve_a × reserve_b × D²`
/// comfortably inside 256 bits.
pub const MAX_RESERVE: u128 = (1u128 << 112) - 1;

/// Narrows a 256-bit value back to `u128`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] with `context` if `value` does not fit.
pub fn narrow(value: U256, context: &'static str) -> Result<u128, AmmError> {
    if value.bits() > 128 {
        return Err(AmmError::Overflow(context));
    }
    Ok(value.low_u128())
}

/// Computes `a × b / d` with a 256-bit intermediate and explicit rounding.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `d` is zero.
/// - [`AmmError::Overflow`] if the quotient does not fit in `u128`.
pub fn mul_div(a: u128, b: u128, d: u128, rounding: Rounding) -> Result<u128, AmmError> {
    if d == 0 {
        return Err(AmmError::DivisionByZero);
    }
    // (2^128 − 1)^2 < 2^256, so the product cannot overflow.
    let product = U256::from(a) * U256::from(b);
    let divisor = U256::from(d);
    let mut quotient = product / divisor;
    if rounding.is_up() && !(product % divisor).is_zero() {
        quotient = quotient
            .checked_add(U256::one())
            .ok_or(AmmError::Overflow("mul_div rounding overflow"))?;
    }
    narrow(quotient, "mul_div quotient exceeds u128")
}

/// Floor integer square root via Newton's method.
#[must_use]
pub fn isqrt(n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    let mut x = n;
    // (n >> 1) + 1 is ceil-ish (n + 1) / 2 without risking overflow at U256::MAX.
    let mut y = (x >> 1usize) + U256::one();
    while y < x {
        x = y;
        y = (x + n / x) >> 1usize;
    }
    x
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn narrow_accepts_u128_range() {
        assert_eq!(narrow(U256::from(u128::MAX), "ctx"), Ok(u128::MAX));
    }

    #[test]
    fn narrow_rejects_wider_values() {
        let wide = U256::from(u128::MAX) + U256::one();
        assert_eq!(narrow(wide, "too wide"), Err(AmmError::Overflow("too wide")));
    }

    #[test]
    fn mul_div_survives_u128_overflowing_product() {
        // u128::MAX * 4 / 8 would overflow a naive u128 multiply.
        let Ok(v) = mul_div(u128::MAX, 4, 8, Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(v, u128::MAX / 2);
    }

    #[test]
    fn mul_div_rounding() {
        assert_eq!(mul_div(10, 1, 3, Rounding::Down), Ok(3));
        assert_eq!(mul_div(10, 1, 3, Rounding::Up), Ok(4));
        assert_eq!(mul_div(9, 1, 3, Rounding::Up), Ok(3));
    }

    #[test]
    fn mul_div_errors() {
        assert_eq!(mul_div(1, 1, 0, Rounding::Down), Err(AmmError::DivisionByZero));
        assert!(matches!(
            mul_div(u128::MAX, u128::MAX, 1, Rounding::Down),
            Err(AmmError::Overflow(_))
        ));
    }

    #[test]
    fn isqrt_exact_squares() {
        assert_eq!(isqrt(U256::zero()), U256::zero());
        assert_eq!(isqrt(U256::one()), U256::one());
        assert_eq!(isqrt(U256::from(400_000_000u64)), U256::from(20_000u64));
    }

    #[test]
    fn isqrt_floors_non_squares() {
        assert_eq!(isqrt(U256::from(8u64)), U256::from(2u64));
        assert_eq!(isqrt(U256::from(99u64)), U256::from(9u64));
    }

    #[test]
    fn isqrt_of_max_fits_in_128_bits() {
        let root = isqrt(U256::MAX);
        assert_eq!(root, U256::from(u128::MAX));
    }

    #[test]
    fn max_reserve_is_112_bits() {
        assert_eq!(U256::from(MAX_RESERVE).bits(), 112);
    }
}
