//! User-facing routing over an [`Exchange`](crate::Exchange).
//!
//! [`Router`] wraps the low-level pool calls into deadline-bound,
//! slippage-checked operations and chains swaps across multi-hop paths.
//! The [`library`] functions price trades against explicit reserves and
//! never touch state.

pub mod library;
mod swap_router;

pub use library::{get_amount_in, get_amount_out, quote};
pub use swap_router::{AddLiquidity, RemoveLiquidity, Router};
