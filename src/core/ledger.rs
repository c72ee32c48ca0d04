//! # Demand ledger: downstream demand bookkeeping and routing.
//!
//! The ledger keeps the downstream's outstanding demand (granted minus delivered) and
//! routes every increment to the candidates that may still use it:
//!
//! ```text
//! request(n)
//!    ├─ undecided ─► every slot: producer known → producer.request(n)
//!    │                           producer missing → pending += n (replayed on attach)
//!    ├─ winner w  ─► slot w only
//!    └─ cancelled ─► dropped
//! ```
//!
//! Candidates do not share a budget: before the decision each one is offered the full
//! increment, since only one of them survives. Demand already delivered to the winner's
//! producer before the decision is **not** replayed when the decision happens; only a
//! producer that attaches later receives its slot's accumulated `pending` amount.
//!
//! Each increment is linearized at the slot's critical section: the winner cell is
//! re-checked per slot, so a candidate that lost before its slot was visited gets nothing.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::slot::CandidateSlot;
use crate::core::winner::WinnerCell;
use crate::flow::Demand;

pub(crate) struct DemandLedger {
    outstanding: AtomicU64,
}

impl DemandLedger {
    pub(crate) fn new() -> Self {
        Self {
            outstanding: AtomicU64::new(0),
        }
    }

    /// Records an increment and returns the new outstanding amount.
    pub(crate) fn grant(&self, n: Demand) -> Demand {
        let prev = self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                Some(Demand::new(cur).saturating_add(n).get())
            })
            .unwrap_or_else(|cur| cur);
        Demand::new(prev).saturating_add(n)
    }

    /// Records one value delivered downstream.
    pub(crate) fn consume_one(&self) {
        let _ = self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                let next = Demand::new(cur).consume(1).get();
                (next != cur).then_some(next)
            });
    }

    pub(crate) fn outstanding(&self) -> Demand {
        Demand::new(self.outstanding.load(Ordering::Acquire))
    }

    /// Routes `n` to the slots the winner cell still admits.
    pub(crate) fn dispatch(&self, n: Demand, winner: &WinnerCell, slots: &[CandidateSlot]) {
        for slot in slots {
            if !winner.admits(slot.index()) {
                continue;
            }
            if let Some(producer) = slot.request(n) {
                producer.request(n);
            }
        }
    }
}
