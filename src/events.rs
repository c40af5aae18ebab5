//! Engine events.
//!
//! Every committed state change appends an [`Event`] to the exchange's
//! log.  Events live inside the transactional state, so a rolled-back
//! operation leaves no event behind.  Hosts drain the log with
//! [`Exchange::take_events`](crate::Exchange::take_events).

use serde::Serialize;

use crate::domain::{Address, Amount, PoolId, Shares, TokenPair};

/// A committed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// A pool was registered.
    PoolCreated {
        pool: PoolId,
        pair: TokenPair,
        /// Zero-based position in creation order.
        index: usize,
    },
    /// Shares were minted against a deposit.
    Mint {
        pool: PoolId,
        recipient: Address,
        amount_a: Amount,
        amount_b: Amount,
        shares: Shares,
    },
    /// Shares were burned and reserves paid out.
    Burn {
        pool: PoolId,
        recipient: Address,
        amount_a: Amount,
        amount_b: Amount,
        shares: Shares,
    },
    /// A swap settled.
    Swap {
        pool: PoolId,
        recipient: Address,
        amount_a_in: Amount,
        amount_b_in: Amount,
        amount_a_out: Amount,
        amount_b_out: Amount,
    },
    /// Reserves were committed.
    Sync {
        pool: PoolId,
        reserve_a: Amount,
        reserve_b: Amount,
    },
    /// The protocol fee recipient changed.
    FeeRecipientChanged { fee_recipient: Option<Address> },
}

impl Event {
    /// The pool the event concerns, if any.
    #[must_use]
    pub const fn pool(&self) -> Option<PoolId> {
        match self {
            Self::PoolCreated { pool, .. }
            | Self::Mint { pool, .. }
            | Self::Burn { pool, .. }
            | Self::Swap { pool, .. }
            | Self::Sync { pool, .. } => Some(*pool),
            Self::FeeRecipientChanged { .. } => None,
        }
    }
}
