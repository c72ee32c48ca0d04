//! # Pull-based demand.
//!
//! [`Demand`] is the amount of values a consumer grants upstream. Increments are
//! additive and saturate at [`Demand::UNBOUNDED`], the sentinel meaning "no further
//! limiting". Once a demand value is unbounded it stays unbounded: consuming from it
//! is a no-op.
//!
//! ## Example
//! ```rust
//! use racevisor::Demand;
//!
//! let d = Demand::new(3).saturating_add(Demand::new(4));
//! assert_eq!(d.get(), 7);
//!
//! let unbounded = d.saturating_add(Demand::UNBOUNDED);
//! assert!(unbounded.is_unbounded());
//! assert!(unbounded.consume(1_000).is_unbounded());
//! ```

use std::fmt;

/// Amount of values a consumer is willing to receive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Demand(u64);

impl Demand {
    /// No demand.
    pub const ZERO: Demand = Demand(0);

    /// No further limiting; the producer may emit freely.
    pub const UNBOUNDED: Demand = Demand(u64::MAX);

    /// Creates a bounded demand of `n` values (`u64::MAX` is [`Demand::UNBOUNDED`]).
    #[inline]
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// Returns the raw amount (`u64::MAX` when unbounded).
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_unbounded(self) -> bool {
        self.0 == u64::MAX
    }

    /// Adds two demand amounts, capping at [`Demand::UNBOUNDED`].
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, other: Demand) -> Demand {
        Demand(self.0.saturating_add(other.0))
    }

    /// Removes `n` delivered values from a bounded demand.
    ///
    /// Unbounded demand is never reduced; bounded demand floors at zero.
    #[inline]
    #[must_use]
    pub const fn consume(self, n: u64) -> Demand {
        if self.is_unbounded() {
            self
        } else {
            Demand(self.0.saturating_sub(n))
        }
    }
}

impl From<u64> for Demand {
    fn from(n: u64) -> Self {
        Demand(n)
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            f.write_str("unbounded")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
