//! Chain-agnostic account and token identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A 32-byte identifier naming a token, an account, or a pool's custody
/// account.
///
/// All 32-byte sequences are valid, so construction is infallible.  The
/// all-zero address is the null identifier: it is never accepted as a
/// token and doubles as the burn address for locked liquidity shares.
///
/// Addresses order lexicographically by byte; that order is the
/// canonical order used to sort token pairs.
///
/// # Examples
///
/// ```
/// use pairswap::domain::Address;
///
/// let addr = Address::from_bytes([1u8; 32]);
/// assert_eq!(addr.as_bytes(), [1u8; 32]);
/// assert!(!addr.is_zero());
/// assert!(Address::ZERO.is_zero());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Address([u8; 32]);

impl Address {
    /// The null address.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates an `Address` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 32-byte representation.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Returns `true` for the null address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
