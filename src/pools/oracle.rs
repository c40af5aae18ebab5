//! Time-weighted average prices from cumulative accumulators.
//!
//! A pool integrates its spot price over time.  Reading the integrals at
//! two moments and dividing their difference by the seconds in between
//! gives the average price over that window.  A single trade can move
//! the spot price but only for the seconds it persists, which makes the
//! average expensive to manipulate.
//!
//! # Example
//!
//! ```text
//! let early = exchange.observe(pool)?;
//! // ... time passes ...
//! let late = exchange.observe(pool)?;
//! let (avg_a, _) = early.twap(&late)?;
//! let quote = avg_a.mul_amount(Amount::new(1_000))?;
//! ```

use serde::Serialize;

use crate::domain::Timestamp;
use crate::error::AmmError;
use crate::math::{PriceCumulative, Uq112x112};

/// Accumulator readings at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PriceObservation {
    /// Integral of `reserve_b / reserve_a` (price of the first token).
    #[serde(serialize_with = "serialize_cumulative")]
    pub price_a_cumulative: PriceCumulative,
    /// Integral of `reserve_a / reserve_b` (price of the second token).
    #[serde(serialize_with = "serialize_cumulative")]
    pub price_b_cumulative: PriceCumulative,
    /// When the reading applies.
    pub timestamp: Timestamp,
}

impl PriceObservation {
    /// Average prices `(price_a, price_b)` between this reading and a
    /// `later` one.
    ///
    /// Accumulator wraparound is handled by wrapping subtraction, so the
    /// window may straddle a wrap.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `later` is not after this
    /// reading.
    pub fn twap(&self, later: &Self) -> Result<(Uq112x112, Uq112x112), AmmError> {
        let elapsed = later.timestamp.elapsed_since(self.timestamp);
        Ok((
            later
                .price_a_cumulative
                .average_since(&self.price_a_cumulative, elapsed)?,
            later
                .price_b_cumulative
                .average_since(&self.price_b_cumulative, elapsed)?,
        ))
    }
}

fn serialize_cumulative<S>(value: &PriceCumulative, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format!("{:x}", value.raw()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::math::U256;

    fn reading(a: U256, b: U256, secs: u64) -> PriceObservation {
        PriceObservation {
            price_a_cumulative: PriceCumulative::from_raw(a),
            price_b_cumulative: PriceCumulative::from_raw(b),
            timestamp: Timestamp::from_secs(secs),
        }
    }

    #[test]
    fn twap_divides_by_window() {
        let early = reading(U256::zero(), U256::zero(), 100);
        let late = reading(U256::from(30u64) << 112usize, U256::from(15u64) << 110usize, 110);
        let Ok((avg_a, avg_b)) = early.twap(&late) else {
            panic!("twap");
        };
        assert_eq!(avg_a.raw(), U256::from(3u64) << 112usize);
        // 0.375 in 112.112
        assert_eq!(avg_b.raw(), U256::from(3u64) << 109usize);
    }

    #[test]
    fn empty_window_rejected() {
        let r = reading(U256::zero(), U256::zero(), 100);
        assert_eq!(r.twap(&r), Err(AmmError::DivisionByZero));
    }

    #[test]
    fn reversed_window_rejected() {
        let early = reading(U256::zero(), U256::zero(), 100);
        let late = reading(U256::from(1u64) << 112usize, U256::zero(), 110);
        assert_eq!(late.twap(&early), Err(AmmError::DivisionByZero));
    }

    #[test]
    fn wrapped_accumulator_still_averages() {
        let early = reading(U256::MAX, U256::MAX, 100);
        // Five seconds later each accumulator gained exactly 5.
        let late = reading(U256::from(4u64), U256::from(4u64), 105);
        let Ok((avg_a, _)) = early.twap(&late) else {
            panic!("twap");
        };
        assert_eq!(avg_a.raw(), U256::one());
    }
}
