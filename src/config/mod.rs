//! Engine configuration.
//!
//! [`EngineConfig`] is the declarative blueprint for an exchange: swap
//! fee, bootstrap liquidity lock and protocol fee share.  It validates on
//! construction and can be loaded from TOML.

mod engine_config;

pub use engine_config::{EngineConfig, DEFAULT_PROTOCOL_FEE_DIVISOR, MINIMUM_LIQUIDITY};
