//! Canonically ordered pair of distinct tokens.

use serde::{Deserialize, Serialize};

use super::Address;
use crate::error::AmmError;

/// An unordered pair of token addresses stored in canonical order.
///
/// The canonical ordering guarantees `first() < second()`, so `(A, B)`
/// and `(B, A)` construct the same value and can never name two pools.
///
/// # Examples
///
/// ```
/// use pairswap::domain::{Address, TokenPair};
///
/// let usdc = Address::from_bytes([1u8; 32]);
/// let weth = Address::from_bytes([2u8; 32]);
///
/// let pair = TokenPair::new(weth, usdc).expect("distinct tokens");
/// assert_eq!(pair.first(), usdc);
/// assert_eq!(pair.second(), weth);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenPair {
    first: Address,
    second: Address,
}

impl TokenPair {
    /// Creates a canonically ordered pair.
    ///
    /// # Errors
    ///
    /// - [`AmmError::IdenticalTokens`] if both addresses are equal.
    /// - [`AmmError::ZeroToken`] if either address is the null address.
    pub fn new(token_a: Address, token_b: Address) -> Result<Self, AmmError> {
        if token_a == token_b {
            return Err(AmmError::IdenticalTokens);
        }
        let (first, second) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        // Only the lower address can be zero once the pair is sorted.
        if first.is_zero() {
            return Err(AmmError::ZeroToken);
        }
        Ok(Self { first, second })
    }

    /// Returns the lower-ordered token.
    #[must_use]
    pub const fn first(&self) -> Address {
        self.first
    }

    /// Returns the higher-ordered token.
    #[must_use]
    pub const fn second(&self) -> Address {
        self.second
    }

    /// Returns `true` if `token` is part of this pair.
    #[must_use]
    pub fn contains(&self, token: &Address) -> bool {
        self.first == *token || self.second == *token
    }

    /// Returns the counterpart of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidPath`] if `token` is not in the pair.
    pub fn other(&self, token: &Address) -> Result<Address, AmmError> {
        if *token == self.first {
            Ok(self.second)
        } else if *token == self.second {
            Ok(self.first)
        } else {
            Err(AmmError::InvalidPath)
        }
    }

    /// Returns `true` when `token` is the pair's first token.
    #[must_use]
    pub fn is_first(&self, token: &Address) -> bool {
        self.first == *token
    }

    /// Reorders a value pair given in `(token_a, …)` order into canonical
    /// `(first, second)` order.
    ///
    /// `token_a` must be one of the pair's tokens; the caller's second
    /// value is assumed to belong to the other one.
    #[must_use]
    pub fn sort_by<T>(&self, token_a: &Address, value_a: T, value_b: T) -> (T, T) {
        if self.is_first(token_a) {
            (value_a, value_b)
        } else {
            (value_b, value_a)
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 32])
    }

    #[test]
    fn sorts_reversed_input() {
        let Ok(pair) = TokenPair::new(addr(2), addr(1)) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.first(), addr(1));
        assert_eq!(pair.second(), addr(2));
    }

    #[test]
    fn argument_order_is_irrelevant() {
        let (Ok(p1), Ok(p2)) = (TokenPair::new(addr(1), addr(2)), TokenPair::new(addr(2), addr(1)))
        else {
            panic!("expected Ok");
        };
        assert_eq!(p1, p2);
    }

    #[test]
    fn rejects_identical_tokens() {
        assert_eq!(
            TokenPair::new(addr(1), addr(1)),
            Err(AmmError::IdenticalTokens)
        );
    }

    #[test]
    fn rejects_zero_token_on_either_side() {
        assert_eq!(TokenPair::new(Address::ZERO, addr(1)), Err(AmmError::ZeroToken));
        assert_eq!(TokenPair::new(addr(1), Address::ZERO), Err(AmmError::ZeroToken));
    }

    #[test]
    fn identical_zero_tokens_report_identical() {
        assert_eq!(
            TokenPair::new(Address::ZERO, Address::ZERO),
            Err(AmmError::IdenticalTokens)
        );
    }

    #[test]
    fn other_returns_counterpart() {
        let Ok(pair) = TokenPair::new(addr(1), addr(2)) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.other(&addr(1)), Ok(addr(2)));
        assert_eq!(pair.other(&addr(2)), Ok(addr(1)));
        assert_eq!(pair.other(&addr(3)), Err(AmmError::InvalidPath));
        assert!(pair.contains(&addr(2)));
        assert!(!pair.contains(&addr(3)));
    }

    #[test]
    fn sort_by_maps_caller_order_to_canonical() {
        let Ok(pair) = TokenPair::new(addr(1), addr(2)) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.sort_by(&addr(1), 10, 20), (10, 20));
        assert_eq!(pair.sort_by(&addr(2), 10, 20), (20, 10));
    }
}
