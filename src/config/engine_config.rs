//! Engine-wide configuration.

use serde::{Deserialize, Serialize};

use crate::domain::{FeeRate, Shares};
use crate::error::AmmError;

/// Shares locked forever on a pool's first deposit.
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Default protocol fee divisor: the protocol receives 1/6 of fee growth.
pub const DEFAULT_PROTOCOL_FEE_DIVISOR: u32 = 6;

/// Immutable parameters shared by every pool an exchange hosts.
///
/// # Derived Values
///
/// - Swap fee retained by the pool: `fee.numerator() / fee.denominator()`
/// - Protocol share of fee growth (when a fee recipient is set):
///   `1 / protocol_fee_divisor`
///
/// # Validation
///
/// - The fee rate must be below 100% with a non-zero denominator.
/// - The minimum liquidity lock must be non-zero.
/// - The protocol fee divisor must be at least 2.
///
/// # Examples
///
/// ```
/// use pairswap::config::EngineConfig;
///
/// let cfg = EngineConfig::from_toml_str(r#"
///     minimum_liquidity = 1000
///     protocol_fee_divisor = 6
///
///     [fee]
///     numerator = 3
///     denominator = 1000
/// "#).expect("valid config");
/// assert_eq!(cfg, EngineConfig::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    fee: FeeRate,
    // Kept as u64 so TOML's 64-bit integers map onto it directly.
    minimum_liquidity: u64,
    protocol_fee_divisor: u32,
}

impl EngineConfig {
    /// Creates a new `EngineConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] if any constraint fails.
    pub fn new(
        fee: FeeRate,
        minimum_liquidity: u64,
        protocol_fee_divisor: u32,
    ) -> Result<Self, AmmError> {
        let config = Self {
            fee,
            minimum_liquidity,
            protocol_fee_divisor,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a TOML document.  Missing keys take their
    /// default values.
    ///
    /// # Errors
    ///
    /// - [`AmmError::ConfigParse`] if the document is not valid TOML for
    ///   this structure.
    /// - [`AmmError::InvalidConfiguration`] if a value violates a constraint.
    pub fn from_toml_str(document: &str) -> Result<Self, AmmError> {
        let config: Self =
            toml::from_str(document).map_err(|e| AmmError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// Deserialization bypasses [`FeeRate::new`], so the fee rate is
    /// re-checked here.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] if any constraint fails.
    pub fn validate(&self) -> Result<(), AmmError> {
        FeeRate::new(self.fee.numerator(), self.fee.denominator())?;
        if self.minimum_liquidity == 0 {
            return Err(AmmError::InvalidConfiguration(
                "minimum liquidity must be non-zero",
            ));
        }
        if self.protocol_fee_divisor < 2 {
            return Err(AmmError::InvalidConfiguration(
                "protocol fee divisor must be at least 2",
            ));
        }
        Ok(())
    }

    /// Returns the swap fee rate.
    #[must_use]
    pub const fn fee(&self) -> FeeRate {
        self.fee
    }

    /// Returns the number of shares locked on a pool's first deposit.
    #[must_use]
    pub const fn minimum_liquidity(&self) -> Shares {
        Shares::new(self.minimum_liquidity as u128)
    }

    /// Returns the protocol fee divisor `d` (protocol takes `1/d` of fee growth).
    #[must_use]
    pub const fn protocol_fee_divisor(&self) -> u32 {
        self.protocol_fee_divisor
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee: FeeRate::THIRTY_BPS,
            minimum_liquidity: MINIMUM_LIQUIDITY,
            protocol_fee_divisor: DEFAULT_PROTOCOL_FEE_DIVISOR,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn accessors() {
        let Ok(fee) = FeeRate::new(1, 100) else {
            panic!("valid fee");
        };
        let Ok(cfg) = EngineConfig::new(fee, 10, 4) else {
            panic!("expected Ok");
        };
        assert_eq!(cfg.fee(), fee);
        assert_eq!(cfg.minimum_liquidity(), Shares::new(10));
        assert_eq!(cfg.protocol_fee_divisor(), 4);
    }

    #[test]
    fn zero_minimum_liquidity_rejected() {
        assert!(matches!(
            EngineConfig::new(FeeRate::THIRTY_BPS, 0, 6),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn divisor_below_two_rejected() {
        assert!(matches!(
            EngineConfig::new(FeeRate::THIRTY_BPS, MINIMUM_LIQUIDITY, 1),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn toml_defaults_fill_missing_keys() {
        let Ok(cfg) = EngineConfig::from_toml_str("protocol_fee_divisor = 3") else {
            panic!("expected Ok");
        };
        assert_eq!(cfg.protocol_fee_divisor(), 3);
        assert_eq!(cfg.fee(), FeeRate::THIRTY_BPS);
        assert_eq!(cfg.minimum_liquidity(), Shares::new(1_000));
    }

    #[test]
    fn toml_fee_is_revalidated() {
        let doc = "[fee]\nnumerator = 5\ndenominator = 5\n";
        assert!(matches!(
            EngineConfig::from_toml_str(doc),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn toml_syntax_error_reported() {
        assert!(matches!(
            EngineConfig::from_toml_str("minimum_liquidity = ="),
            Err(AmmError::ConfigParse(_))
        ));
    }
}
