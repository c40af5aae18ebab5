//! Deterministic pool handles.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Address, TokenPair};

/// Domain separator for pool handle derivation.
const POOL_ID_DOMAIN: &[u8] = b"PAIRSWAP_POOL_V1";

/// Deterministic handle of the pool for one unordered token pair.
///
/// `PoolId = blake3(POOL_ID_DOMAIN || first || second)`.  Because the
/// pair is canonically ordered, the handle is independent of argument
/// order, and it can be computed before the pool exists.  The same
/// bytes name the pool's custody account on the token ledger.
///
/// # Examples
///
/// ```
/// use pairswap::domain::{Address, PoolId, TokenPair};
///
/// let a = Address::from_bytes([1u8; 32]);
/// let b = Address::from_bytes([2u8; 32]);
/// let ab = TokenPair::new(a, b).expect("distinct");
/// let ba = TokenPair::new(b, a).expect("distinct");
/// assert_eq!(PoolId::derive(&ab), PoolId::derive(&ba));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolId([u8; 32]);

impl PoolId {
    /// Derives the handle for `pair`.
    #[must_use]
    pub fn derive(pair: &TokenPair) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(POOL_ID_DOMAIN);
        hasher.update(&pair.first().as_bytes());
        hasher.update(&pair.second().as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// The pool's custody account on the token ledger.
    #[must_use]
    pub const fn address(&self) -> Address {
        Address::from_bytes(self.0)
    }

    /// Returns the raw handle bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Eight bytes are plenty to tell pools apart in logs.
        write!(f, "pool:{}", hex::encode(&self.0[..8]))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn pair(x: u8, y: u8) -> TokenPair {
        let Ok(p) = TokenPair::new(Address::from_bytes([x; 32]), Address::from_bytes([y; 32]))
        else {
            panic!("valid pair");
        };
        p
    }

    #[test]
    fn derivation_is_stable() {
        assert_eq!(PoolId::derive(&pair(1, 2)), PoolId::derive(&pair(1, 2)));
    }

    #[test]
    fn distinct_pairs_get_distinct_handles() {
        assert_ne!(PoolId::derive(&pair(1, 2)), PoolId::derive(&pair(1, 3)));
    }

    #[test]
    fn custody_address_is_never_zero() {
        assert!(!PoolId::derive(&pair(1, 2)).address().is_zero());
    }

    #[test]
    fn display_is_short_hex() {
        let shown = PoolId::derive(&pair(1, 2)).to_string();
        assert!(shown.starts_with("pool:"));
        assert_eq!(shown.len(), 5 + 16);
    }
}
