//! Fundamental domain value types used throughout the engine.
//!
//! This module contains the value types that model the exchange domain:
//! addresses, token amounts, liquidity shares, timestamps, fee rates,
//! canonically ordered pairs and deterministic pool handles.  All types
//! are newtypes with validated constructors.

mod address;
mod amount;
mod fee_rate;
mod pool_id;
mod rounding;
mod shares;
mod timestamp;
mod token_pair;

pub use address::Address;
pub use amount::Amount;
pub use fee_rate::FeeRate;
pub use pool_id::PoolId;
pub use rounding::Rounding;
pub use shares::Shares;
pub use timestamp::Timestamp;
pub use token_pair::TokenPair;
