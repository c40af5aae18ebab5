//! Seams between the engine and its host.
//!
//! [`Clock`] supplies time; [`FlashSwapCallee`] is the narrow capability
//! a flash-swap recipient implements to receive an optimistic transfer.

mod clock;
mod flash_swap_callee;

pub use clock::{Clock, ManualClock, SystemClock};
pub use flash_swap_callee::{FlashSwapCallee, FlashSwapContext};
