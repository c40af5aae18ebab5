//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use pairswap::prelude::*;
//! ```

pub use crate::domain::{Address, Amount, FeeRate, PoolId, Rounding, Shares, Timestamp, TokenPair};

pub use crate::traits::{Clock, FlashSwapCallee, FlashSwapContext, ManualClock, SystemClock};

pub use crate::math::CheckedArithmetic;

pub use crate::config::EngineConfig;

pub use crate::error::AmmError;

pub use crate::events::Event;

pub use crate::exchange::Exchange;

pub use crate::pools::{PriceObservation, Reserves};

pub use crate::router::{AddLiquidity, RemoveLiquidity, Router};
