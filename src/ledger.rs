//! Multi-token balance ledger.
//!
//! The ledger is the custody substrate the engine runs on: every token
//! balance, including each pool's holdings, lives here.  Pools never
//! trust a caller's claim about what was deposited; they measure their
//! own ledger balance against their tracked reserves.

use std::collections::HashMap;

use crate::domain::{Address, Amount};
use crate::error::AmmError;
use crate::math::CheckedArithmetic;

/// Balances keyed by `(token, owner)`.
///
/// # Invariant
///
/// For every token, the sum of all balances equals
/// [`total_issued`](Self::total_issued).  Transfers move value; only
/// [`issue`](Self::issue) creates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    balances: HashMap<(Address, Address), Amount>,
    issued: HashMap<Address, Amount>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `owner`'s balance of `token`.
    pub fn balance_of(&self, token: &Address, owner: &Address) -> Amount {
        self.balances
            .get(&(*token, *owner))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Total units of `token` ever issued.
    pub fn total_issued(&self, token: &Address) -> Amount {
        self.issued.get(token).copied().unwrap_or(Amount::ZERO)
    }

    /// Creates `amount` new units of `token` owned by `to`.
    ///
    /// This is the host's hook for bringing external assets into the
    /// engine; nothing inside the engine calls it.
    ///
    /// # Errors
    ///
    /// - [`AmmError::ZeroToken`] if `token` is the null address.
    /// - [`AmmError::Overflow`] if the supply would overflow.
    pub fn issue(&mut self, token: Address, to: Address, amount: Amount) -> Result<(), AmmError> {
        if token.is_zero() {
            return Err(AmmError::ZeroToken);
        }
        let supply = self.total_issued(&token).safe_add(&amount)?;
        let balance = self.balance_of(&token, &to).safe_add(&amount)?;
        self.issued.insert(token, supply);
        self.balances.insert((token, to), balance);
        Ok(())
    }

    /// Moves `amount` of `token` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InsufficientBalance`] if `from` holds less
    /// than `amount`.  The ledger is unchanged on error.
    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AmmError> {
        if amount.is_zero() {
            return Ok(());
        }
        let debited = self
            .balance_of(&token, &from)
            .checked_sub(&amount)
            .ok_or(AmmError::InsufficientBalance)?;
        if from == to {
            return Ok(());
        }
        // Cannot overflow: the credit is bounded by the token's total supply.
        let credited = self.balance_of(&token, &to).safe_add(&amount)?;
        self.balances.insert((token, from), debited);
        self.balances.insert((token, to), credited);
        Ok(())
    }
}
