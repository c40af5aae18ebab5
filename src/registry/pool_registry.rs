//! Pool registry: one pool per unordered token pair.

use std::collections::BTreeMap;

use tracing::info;

use crate::domain::{Address, PoolId, Timestamp, TokenPair};
use crate::error::AmmError;
use crate::pools::ConstantProductPool;

/// Registry of every pool an exchange hosts.
///
/// Pool handles are derived from the canonical pair
/// ([`PoolId::derive`]), so the handle for a pair is known before the
/// pool exists and never depends on argument order.
///
/// # Administration
///
/// The fee recipient setter is the only account allowed to change the
/// protocol fee recipient or hand the setter role to someone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRegistry {
    pools: BTreeMap<PoolId, ConstantProductPool>,
    all_pools: Vec<PoolId>,
    fee_recipient: Option<Address>,
    fee_recipient_setter: Address,
}

impl PoolRegistry {
    /// Creates an empty registry administered by `fee_recipient_setter`.
    #[must_use]
    pub const fn new(fee_recipient_setter: Address) -> Self {
        Self {
            pools: BTreeMap::new(),
            all_pools: Vec::new(),
            fee_recipient: None,
            fee_recipient_setter,
        }
    }

    /// Registers a new pool for `(token_a, token_b)`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::IdenticalTokens`] if the tokens are equal.
    /// - [`AmmError::ZeroToken`] if either token is the null address.
    /// - [`AmmError::PoolExists`] if the pair already has a pool.
    pub fn create_pool(
        &mut self,
        token_a: Address,
        token_b: Address,
        now: Timestamp,
    ) -> Result<PoolId, AmmError> {
        let pair = TokenPair::new(token_a, token_b)?;
        let id = PoolId::derive(&pair);
        if self.pools.contains_key(&id) {
            return Err(AmmError::PoolExists);
        }
        self.pools.insert(id, ConstantProductPool::new(pair, now));
        self.all_pools.push(id);
        info!(
            pool = %id,
            token_a = %pair.first(),
            token_b = %pair.second(),
            index = self.all_pools.len() - 1,
            "pool created"
        );
        Ok(id)
    }

    /// Looks up the pool for an unordered pair.  Invalid pairs have no pool.
    #[must_use]
    pub fn get_pool(&self, token_a: Address, token_b: Address) -> Option<PoolId> {
        let pair = TokenPair::new(token_a, token_b).ok()?;
        let id = PoolId::derive(&pair);
        self.pools.contains_key(&id).then_some(id)
    }

    /// Returns the pool behind `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::UnknownPool`] if no such pool is registered.
    pub fn pool(&self, id: &PoolId) -> Result<&ConstantProductPool, AmmError> {
        self.pools.get(id).ok_or(AmmError::UnknownPool)
    }

    pub(crate) fn pool_mut(&mut self, id: &PoolId) -> Result<&mut ConstantProductPool, AmmError> {
        self.pools.get_mut(id).ok_or(AmmError::UnknownPool)
    }

    /// Every pool handle in creation order.
    #[must_use]
    pub fn all_pools(&self) -> &[PoolId] {
        &self.all_pools
    }

    /// Number of registered pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.all_pools.len()
    }

    /// Returns the protocol fee recipient, if the protocol fee is on.
    #[must_use]
    pub const fn fee_recipient(&self) -> Option<Address> {
        self.fee_recipient
    }

    /// Returns the account allowed to administer the fee recipient.
    #[must_use]
    pub const fn fee_recipient_setter(&self) -> Address {
        self.fee_recipient_setter
    }

    /// Sets or clears the protocol fee recipient.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Forbidden`] unless `caller` is the setter.
    pub fn set_fee_recipient(
        &mut self,
        caller: Address,
        fee_recipient: Option<Address>,
    ) -> Result<(), AmmError> {
        if caller != self.fee_recipient_setter {
            return Err(AmmError::Forbidden);
        }
        self.fee_recipient = fee_recipient;
        match fee_recipient {
            Some(recipient) => info!(%recipient, "protocol fee enabled"),
            None => info!("protocol fee disabled"),
        }
        Ok(())
    }

    /// Hands the setter role to `new_setter`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Forbidden`] unless `caller` is the setter.
    pub fn set_fee_recipient_setter(
        &mut self,
        caller: Address,
        new_setter: Address,
    ) -> Result<(), AmmError> {
        if caller != self.fee_recipient_setter {
            return Err(AmmError::Forbidden);
        }
        self.fee_recipient_setter = new_setter;
        info!(setter = %new_setter, "fee recipient setter changed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 32])
    }

    const ADMIN: u8 = 0xAD;

    fn registry_with_pool() -> (PoolRegistry, PoolId) {
        let mut registry = PoolRegistry::new(addr(ADMIN));
        let Ok(id) = registry.create_pool(addr(2), addr(1), Timestamp::default()) else {
            panic!("create pool");
        };
        (registry, id)
    }

    #[test]
    fn create_then_lookup_either_order() {
        let (registry, id) = registry_with_pool();
        assert_eq!(registry.get_pool(addr(1), addr(2)), Some(id));
        assert_eq!(registry.get_pool(addr(2), addr(1)), Some(id));
        assert_eq!(registry.pool_count(), 1);
        assert_eq!(registry.all_pools(), &[id]);
    }

    #[test]
    fn handle_is_predictable() {
        let (_, id) = registry_with_pool();
        let Ok(pair) = TokenPair::new(addr(1), addr(2)) else {
            panic!("pair");
        };
        assert_eq!(id, PoolId::derive(&pair));
    }

    #[test]
    fn duplicate_pair_rejected() {
        let (mut registry, _) = registry_with_pool();
        assert_eq!(
            registry.create_pool(addr(1), addr(2), Timestamp::default()),
            Err(AmmError::PoolExists)
        );
        assert_eq!(registry.pool_count(), 1);
    }

    #[test]
    fn invalid_pairs_rejected() {
        let mut registry = PoolRegistry::new(addr(ADMIN));
        assert_eq!(
            registry.create_pool(addr(1), addr(1), Timestamp::default()),
            Err(AmmError::IdenticalTokens)
        );
        assert_eq!(
            registry.create_pool(Address::ZERO, addr(1), Timestamp::default()),
            Err(AmmError::ZeroToken)
        );
        assert_eq!(registry.get_pool(addr(1), addr(1)), None);
        assert_eq!(registry.get_pool(addr(1), addr(3)), None);
    }

    #[test]
    fn fee_recipient_admin_only() {
        let mut registry = PoolRegistry::new(addr(ADMIN));
        assert_eq!(
            registry.set_fee_recipient(addr(9), Some(addr(9))),
            Err(AmmError::Forbidden)
        );
        let Ok(()) = registry.set_fee_recipient(addr(ADMIN), Some(addr(9))) else {
            panic!("admin sets recipient");
        };
        assert_eq!(registry.fee_recipient(), Some(addr(9)));
    }

    #[test]
    fn setter_role_transfers() {
        let mut registry = PoolRegistry::new(addr(ADMIN));
        let Ok(()) = registry.set_fee_recipient_setter(addr(ADMIN), addr(5)) else {
            panic!("handover");
        };
        assert_eq!(
            registry.set_fee_recipient(addr(ADMIN), None),
            Err(AmmError::Forbidden)
        );
        assert!(registry.set_fee_recipient(addr(5), None).is_ok());
    }
}
