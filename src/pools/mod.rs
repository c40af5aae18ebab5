//! Constant-product pools and their supporting state.
//!
//! | Module | Contents |
//! |--------|----------|
//! | `constant_product` | [`ConstantProductPool`]: reserves, mint, burn, swap settlement |
//! | `shares` | [`LiquidityShares`]: per-pool fungible share accounting |
//! | `oracle` | [`PriceObservation`]: cumulative-price readings and TWAP |

pub mod constant_product;
pub mod oracle;
pub mod shares;

#[cfg(test)]
mod proptest_properties;

pub use constant_product::{ConstantProductPool, LiquidityDelta, Reserves};
pub use oracle::PriceObservation;
pub use shares::{LiquidityShares, BURN_ADDRESS};
