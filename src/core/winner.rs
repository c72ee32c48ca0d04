//! # Single-assignment winner cell.
//!
//! One `AtomicUsize` holds the race decision. Two sentinels sit above any valid
//! candidate index:
//!
//! ```text
//! UNDECIDED ──claim(i)──► i          (exactly one successful claim, ever)
//!     └──────cancel()───► CANCELLED  (downstream left before a decision)
//! ```
//!
//! Both transitions are a single compare-and-set, so losing threads take a
//! lock-free discard path.

use std::sync::atomic::{AtomicUsize, Ordering};

const UNDECIDED: usize = usize::MAX;
const CANCELLED: usize = usize::MAX - 1;

/// Decision state observed by a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Undecided,
    Winner(usize),
    Cancelled,
}

/// Outcome of [`WinnerCell::claim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Claim {
    /// This call performed the one and only decision.
    Decided,
    /// The caller had already won.
    AlreadyWinner,
    /// Another candidate won, or the race was cancelled.
    Lost,
}

pub(crate) struct WinnerCell {
    state: AtomicUsize,
}

impl WinnerCell {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicUsize::new(UNDECIDED),
        }
    }

    /// Attempts to make `index` the winner.
    pub(crate) fn claim(&self, index: usize) -> Claim {
        debug_assert!(index < CANCELLED, "candidate index collides with a sentinel");
        match self
            .state
            .compare_exchange(UNDECIDED, index, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Claim::Decided,
            Err(current) if current == index => Claim::AlreadyWinner,
            Err(_) => Claim::Lost,
        }
    }

    /// Settles an undecided race as cancelled.
    ///
    /// Returns the state found when the cell was already settled.
    pub(crate) fn cancel(&self) -> Result<(), Decision> {
        self.state
            .compare_exchange(UNDECIDED, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(Self::decode)
    }

    pub(crate) fn get(&self) -> Decision {
        Self::decode(self.state.load(Ordering::Acquire))
    }

    /// Returns `true` while `index` can still receive demand or producers.
    #[inline]
    pub(crate) fn admits(&self, index: usize) -> bool {
        let state = self.state.load(Ordering::Acquire);
        state == UNDECIDED || state == index
    }

    fn decode(raw: usize) -> Decision {
        match raw {
            UNDECIDED => Decision::Undecided,
            CANCELLED => Decision::Cancelled,
            index => Decision::Winner(index),
        }
    }
}
