//! Pure constant-product pricing against given reserves.
//!
//! With fee `N / D` and fee complement `C = D − N`:
//!
//! ```text
//! quote          = amount_a · reserve_b / reserve_a
//! get_amount_out = amount_in·C·reserve_out / (reserve_in·D + amount_in·C)
//! get_amount_in  = reserve_in·amount_out·D / ((reserve_out − amount_out)·C) + 1
//! ```
//!
//! `get_amount_out` rounds down and `get_amount_in` rounds up, so an
//! amount computed here always satisfies the pool's swap invariant.

use crate::domain::{Amount, FeeRate, Rounding};
use crate::error::AmmError;
use crate::math::{mul_div, narrow, U256};

/// Converts `amount_a` into the equivalent amount of the other token at
/// the current reserve ratio, with no fee.
///
/// # Errors
///
/// - [`AmmError::InsufficientInputAmount`] if `amount_a` is zero.
/// - [`AmmError::InsufficientLiquidity`] if either reserve is zero.
pub fn quote(amount_a: Amount, reserve_a: Amount, reserve_b: Amount) -> Result<Amount, AmmError> {
    if amount_a.is_zero() {
        return Err(AmmError::InsufficientInputAmount);
    }
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    mul_div(amount_a.get(), reserve_b.get(), reserve_a.get(), Rounding::Down).map(Amount::new)
}

/// Output received for selling exactly `amount_in`.
///
/// # Errors
///
/// - [`AmmError::InsufficientInputAmount`] if `amount_in` is zero.
/// - [`AmmError::InsufficientLiquidity`] if either reserve is zero.
/// - [`AmmError::Overflow`] if an intermediate exceeds 256 bits.
pub fn get_amount_out(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee: FeeRate,
) -> Result<Amount, AmmError> {
    if amount_in.is_zero() {
        return Err(AmmError::InsufficientInputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    let in_with_fee = U256::from(amount_in.get()) * U256::from(fee.complement());
    let numerator = in_with_fee
        .checked_mul(U256::from(reserve_out.get()))
        .ok_or(AmmError::Overflow("amount out numerator overflow"))?;
    let denominator = (U256::from(reserve_in.get()) * U256::from(fee.denominator()))
        .checked_add(in_with_fee)
        .ok_or(AmmError::Overflow("amount out denominator overflow"))?;
    narrow(numerator / denominator, "amount out exceeds u128").map(Amount::new)
}

/// Input required to buy exactly `amount_out`.
///
/// # Errors
///
/// - [`AmmError::InsufficientOutputAmount`] if `amount_out` is zero.
/// - [`AmmError::InsufficientLiquidity`] if either reserve is zero or
///   `amount_out` would drain the output reserve.
/// - [`AmmError::Overflow`] if the input exceeds `u128`.
pub fn get_amount_in(
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee: FeeRate,
) -> Result<Amount, AmmError> {
    if amount_out.is_zero() {
        return Err(AmmError::InsufficientOutputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_out >= reserve_out {
        return Err(AmmError::InsufficientLiquidity);
    }
    let numerator = (U256::from(reserve_in.get()) * U256::from(amount_out.get()))
        .checked_mul(U256::from(fee.denominator()))
        .ok_or(AmmError::Overflow("amount in numerator overflow"))?;
    // reserve_out > amount_out was checked above.
    let denominator = U256::from(reserve_out.get() - amount_out.get())
        * U256::from(fee.complement());
    narrow(
        numerator / denominator + U256::one(),
        "amount in exceeds u128",
    )
    .map(Amount::new)
}
