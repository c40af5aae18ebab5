//! Pool registration and protocol administration.
//!
//! [`PoolRegistry`] enforces at most one pool per unordered token pair,
//! hands out deterministic handles, and holds the admin-controlled
//! protocol fee recipient.

mod pool_registry;

pub use pool_registry::PoolRegistry;
