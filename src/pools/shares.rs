//! Fungible liquidity-share accounting embedded in every pool.

use std::collections::HashMap;

use crate::domain::{Address, Shares};
use crate::error::AmmError;
use crate::math::CheckedArithmetic;

/// The burn address.  Shares held here are permanently unspendable.
pub const BURN_ADDRESS: Address = Address::ZERO;

/// Share balances for one pool.
///
/// # Accounting Invariant
///
/// `total_supply` equals the sum of every tracked balance at all times,
/// including the bootstrap shares locked at [`BURN_ADDRESS`].
///
/// Minting and burning are reserved for the owning pool: the `caller`
/// must be the pool's custody account or the call fails with
/// [`AmmError::Forbidden`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityShares {
    minter: Address,
    balances: HashMap<Address, Shares>,
    total_supply: Shares,
}

impl LiquidityShares {
    /// Creates an empty share ledger owned by `minter`.
    #[must_use]
    pub fn new(minter: Address) -> Self {
        Self {
            minter,
            balances: HashMap::new(),
            total_supply: Shares::ZERO,
        }
    }

    /// Returns `owner`'s share balance.
    #[must_use]
    pub fn balance_of(&self, owner: &Address) -> Shares {
        self.balances.get(owner).copied().unwrap_or(Shares::ZERO)
    }

    /// Returns the sum of all balances.
    #[must_use]
    pub const fn total_supply(&self) -> Shares {
        self.total_supply
    }

    /// Iterates over every holder with a non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Shares)> {
        self.balances.iter().filter(|(_, s)| !s.is_zero())
    }

    /// Moves shares between holders.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Forbidden`] if `from` is the burn address.
    /// - [`AmmError::InsufficientBalance`] if `from` holds less than `amount`.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Shares) -> Result<(), AmmError> {
        if from == BURN_ADDRESS {
            return Err(AmmError::Forbidden);
        }
        let debited = self
            .balance_of(&from)
            .checked_sub(&amount)
            .ok_or(AmmError::InsufficientBalance)?;
        if amount.is_zero() || from == to {
            return Ok(());
        }
        let credited = self.balance_of(&to).safe_add(&amount)?;
        self.balances.insert(from, debited);
        self.balances.insert(to, credited);
        Ok(())
    }

    /// Creates `amount` new shares owned by `to`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Forbidden`] if `caller` is not the owning pool.
    /// - [`AmmError::Overflow`] if the total supply would overflow.
    pub fn mint(&mut self, caller: Address, to: Address, amount: Shares) -> Result<(), AmmError> {
        if caller != self.minter {
            return Err(AmmError::Forbidden);
        }
        let supply = self.total_supply.safe_add(&amount)?;
        // A balance never exceeds the supply, so this cannot overflow once the supply did not.
        let balance = self.balance_of(&to).safe_add(&amount)?;
        self.total_supply = supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    /// Destroys `amount` shares held by `from`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Forbidden`] if `caller` is not the owning pool.
    /// - [`AmmError::InsufficientBalance`] if `from` holds less than `amount`.
    pub fn burn(&mut self, caller: Address, from: Address, amount: Shares) -> Result<(), AmmError> {
        if caller != self.minter {
            return Err(AmmError::Forbidden);
        }
        let balance = self
            .balance_of(&from)
            .checked_sub(&amount)
            .ok_or(AmmError::InsufficientBalance)?;
        let supply = self.total_supply.safe_sub(&amount)?;
        self.total_supply = supply;
        if balance.is_zero() {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, balance);
        }
        Ok(())
    }
}
