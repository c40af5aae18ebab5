//! Flash-swap callback capability.
//!
//! A swap invoked with non-empty callback data hands its output to the
//! recipient *before* any payment has been received, then calls the
//! recipient's [`FlashSwapCallee::on_flash_swap`].  The callee may do
//! anything with the borrowed tokens, including trading on other pools
//! through the exchange handle it is given, as long as the pool ends up
//! holding enough to satisfy the fee-adjusted constant product.
//!
//! # Trust Model
//!
//! The callee is never trusted.  Once it returns, the pool measures its
//! own ledger balances and re-verifies the invariant from scratch.  If
//! the callee fails, or repays too little, the whole swap is undone.
//! While the callback runs, the pool is locked: any attempt by the
//! callee to mint, burn, swap, skim or sync on the same pool fails with
//! [`AmmError::Locked`](crate::error::AmmError::Locked).

use crate::domain::{Amount, PoolId};
use crate::error::AmmError;
use crate::exchange::Exchange;

/// What a flash-swap callee is told about the loan it received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashSwapContext<'a> {
    /// The pool that lent the tokens.
    pub pool: PoolId,
    /// Units of the pair's first token sent to the recipient.
    pub amount_a_out: Amount,
    /// Units of the pair's second token sent to the recipient.
    pub amount_b_out: Amount,
    /// Opaque bytes forwarded from the swap call.
    pub data: &'a [u8],
}

/// The entry point a flash-swap recipient exposes.
pub trait FlashSwapCallee {
    /// Uses the borrowed output and repays the pool.
    ///
    /// `exchange` is the same exchange the swap runs on.  Repayment is
    /// made by transferring tokens to the pool's custody address
    /// ([`PoolId::address`]).
    ///
    /// # Errors
    ///
    /// Any error returned here aborts the outer swap with that error.
    fn on_flash_swap(
        &mut self,
        exchange: &mut Exchange,
        context: &FlashSwapContext<'_>,
    ) -> Result<(), AmmError>;
}
