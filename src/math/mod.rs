//! Arithmetic utilities for pool accounting.
//!
//! This module provides [`CheckedArithmetic`] for overflow-safe domain
//! arithmetic, 256-bit intermediates ([`U256`], [`mul_div`], [`isqrt`])
//! for products that outgrow `u128`, and the [`Uq112x112`] fixed-point
//! type backing the cumulative price oracle.

mod checked;
mod uq112x112;
mod wide;

pub use checked::CheckedArithmetic;
pub use uq112x112::{PriceCumulative, Uq112x112, RESOLUTION};
pub use wide::{isqrt, mul_div, narrow, U256, MAX_RESERVE};
