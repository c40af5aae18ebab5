//! Explicit rounding direction for integer division.

/// Rounding direction for every division performed by the engine.
///
/// Share and token amounts paid *out* of a pool always round down;
/// amounts a trader must pay *in* round up.  Making the direction a
/// parameter keeps that choice visible at each call site.
///
/// # Examples
///
/// ```
/// use pairswap::domain::Rounding;
///
/// assert_eq!(Rounding::Down.div(10, 3), Some(3));
/// assert_eq!(Rounding::Up.div(10, 3), Some(4));
/// assert_eq!(Rounding::Up.div(10, 0), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Divides `n` by `d` in this direction.  Returns `None` if `d` is zero.
    #[must_use]
    pub const fn div(&self, n: u128, d: u128) -> Option<u128> {
        if d == 0 {
            return None;
        }
        let q = n / d;
        match self {
            Self::Down => Some(q),
            // q + 1 cannot overflow: a non-zero remainder implies q < u128::MAX.
            Self::Up if n % d != 0 => Some(q + 1),
            Self::Up => Some(q),
        }
    }
}
