//! # Candidate slot: per-source bookkeeping.
//!
//! A slot owns one candidate's subscription handle and its producer. The producer may
//! show up late (after subscription, after demand was already requested), so a slot
//! moves through explicit phases:
//!
//! ```text
//! AwaitingProducer{pending} ──producer──► ProducerAttached(p)
//!          │                                    │
//!          ├──────────── sever() ───────────────┼──► Severed   (lost / race cancelled)
//!          └──────────── release() ─────────────┴──► Released  (winner terminated)
//! ```
//!
//! ## Rules
//! - Every transition happens under the slot's own mutex, never under a race-wide lock.
//! - Callbacks into sources (`request`, `cancel`) run **after** the lock is released;
//!   the methods here hand the handles back to the coordinator instead of calling them.
//! - `Severed` and `Released` are final, which makes severance exactly-once.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::flow::{Demand, ProducerRef, SubscriptionRef};

enum Phase {
    AwaitingProducer { pending: Demand },
    ProducerAttached(ProducerRef),
    Severed,
    Released,
}

struct SlotInner {
    subscription: Option<SubscriptionRef>,
    phase: Phase,
}

/// Outcome of [`CandidateSlot::attach_producer`].
pub(crate) enum AttachProducer {
    /// Producer recorded; `replay` is the demand accumulated while it was missing.
    Attached { replay: Demand },
    /// Slot is already severed or released.
    Rejected(ProducerRef),
    /// A producer was already attached.
    Duplicate(ProducerRef),
}

/// Handles taken out of a slot that is being torn down.
pub(crate) struct Severance {
    pub(crate) subscription: Option<SubscriptionRef>,
    pub(crate) producer: Option<ProducerRef>,
}

pub(crate) struct CandidateSlot {
    index: usize,
    source: Arc<str>,
    inner: Mutex<SlotInner>,
}

impl CandidateSlot {
    pub(crate) fn new(index: usize, source: impl Into<Arc<str>>) -> Self {
        Self {
            index,
            source: source.into(),
            inner: Mutex::new(SlotInner {
                subscription: None,
                phase: Phase::AwaitingProducer {
                    pending: Demand::ZERO,
                },
            }),
        }
    }

    #[inline]
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub(crate) fn source(&self) -> &Arc<str> {
        &self.source
    }

    /// Stores the subscription returned by `subscribe`.
    ///
    /// Returns it back when the slot was torn down while `subscribe` was running;
    /// the caller must cancel it.
    pub(crate) fn attach_subscription(
        &self,
        subscription: SubscriptionRef,
    ) -> Option<SubscriptionRef> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        match inner.phase {
            Phase::Severed | Phase::Released => Some(subscription),
            _ => {
                inner.subscription = Some(subscription);
                None
            }
        }
    }

    /// Moves the slot from `AwaitingProducer` to `ProducerAttached`.
    pub(crate) fn attach_producer(&self, producer: ProducerRef) -> AttachProducer {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        match inner.phase {
            Phase::AwaitingProducer { pending } => {
                inner.phase = Phase::ProducerAttached(Arc::clone(&producer));
                AttachProducer::Attached { replay: pending }
            }
            Phase::ProducerAttached(_) => AttachProducer::Duplicate(producer),
            Phase::Severed | Phase::Released => AttachProducer::Rejected(producer),
        }
    }

    /// Routes a demand increment to this slot.
    ///
    /// Accumulates while the producer is missing; otherwise returns the producer the
    /// caller must forward `n` to.
    pub(crate) fn request(&self, n: Demand) -> Option<ProducerRef> {
        let mut inner = self.inner.lock();
        match &mut inner.phase {
            Phase::AwaitingProducer { pending } => {
                *pending = pending.saturating_add(n);
                None
            }
            Phase::ProducerAttached(producer) => Some(Arc::clone(producer)),
            Phase::Severed | Phase::Released => None,
        }
    }

    /// Tears the slot down as a loser (or on race cancellation).
    ///
    /// Returns `None` if the slot was already severed or released.
    pub(crate) fn sever(&self) -> Option<Severance> {
        self.take(Phase::Severed)
    }

    /// Tears the slot down after the winner's terminal signal.
    pub(crate) fn release(&self) -> Option<Severance> {
        self.take(Phase::Released)
    }

    fn take(&self, next: Phase) -> Option<Severance> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let producer = match std::mem::replace(&mut inner.phase, next) {
            Phase::AwaitingProducer { .. } => None,
            Phase::ProducerAttached(producer) => Some(producer),
            done @ (Phase::Severed | Phase::Released) => {
                inner.phase = done;
                return None;
            }
        };
        Some(Severance {
            subscription: inner.subscription.take(),
            producer,
        })
    }

    #[cfg(test)]
    fn pending(&self) -> Option<Demand> {
        match self.inner.lock().phase {
            Phase::AwaitingProducer { pending } => Some(pending),
            _ => None,
        }
    }
}
