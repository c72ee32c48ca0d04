//! # Race coordinator: winner selection, relay and severance.
//!
//! One coordinator exists per race instance (per `Amb::race` call). It owns the
//! candidate slots, the winner cell and the demand ledger, and it is the only place
//! that talks to the downstream observer.
//!
//! ## Signal path
//! ```text
//! candidate i ── on_signal(i, signal) ──► winner.claim(i)
//!                                            ├─ Decided       ─► sever every j != i
//!                                            │                   publish WinnerDecided
//!                                            │                   relay(signal)
//!                                            ├─ AlreadyWinner ─► relay(signal)
//!                                            └─ Lost          ─► discard (ResidualDiscarded)
//!
//! relay: phase OPEN      ─► Next: deliver | Error/Complete: OPEN→FINISHED, deliver once
//!        phase FINISHED  ─► ProtocolViolation (signal after terminal), dropped
//!        phase CANCELLED ─► ResidualDiscarded, dropped
//! ```
//!
//! ## Rules
//! - The decision is a single CAS on [`WinnerCell`]; no lock spans decision and relay.
//! - Losers are severed **before** the deciding signal reaches downstream.
//! - Severance of a slot happens exactly once (slot phases are final).
//! - Cancellation failures are published as `SeverFailed` and otherwise ignored;
//!   panics inside `cancel()` are caught.
//! - Signals are relayed on the emitting thread, preserving the winner's order.
//! - The downstream is detached after the terminal signal or a cancellation, so a
//!   downstream holding its [`RaceHandle`](crate::RaceHandle) does not keep the race alive.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;

use crate::core::ledger::DemandLedger;
use crate::core::slot::{AttachProducer, CandidateSlot};
use crate::core::winner::{Claim, Decision, WinnerCell};
use crate::error::{SeverError, panic_info};
use crate::events::{Bus, Event, EventKind};
use crate::flow::{Demand, ObserverRef, ProducerRef, Signal, SignalKind, SubscriptionRef};

const OPEN: u8 = 0;
const FINISHED: u8 = 1;
const CANCELLED: u8 = 2;

pub(crate) struct Coordinator<T, E> {
    id: u64,
    label: Arc<str>,
    slots: Box<[CandidateSlot]>,
    winner: WinnerCell,
    phase: AtomicU8,
    ledger: DemandLedger,
    downstream: Mutex<Option<ObserverRef<T, E>>>,
    bus: Bus,
    demand_events: bool,
}

impl<T, E> Coordinator<T, E> {
    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn decision(&self) -> Decision {
        self.winner.get()
    }

    /// Returns `true` once the race is decided or cancelled.
    #[inline]
    pub(crate) fn is_settled(&self) -> bool {
        !matches!(self.winner.get(), Decision::Undecided)
    }

    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.phase.load(Ordering::Acquire) == CANCELLED
    }

    #[inline]
    pub(crate) fn is_finished(&self) -> bool {
        self.phase.load(Ordering::Acquire) == FINISHED
    }

    #[inline]
    pub(crate) fn outstanding(&self) -> Demand {
        self.ledger.outstanding()
    }
}

impl<T, E> Coordinator<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new(
        id: u64,
        label: Arc<str>,
        sources: &[Arc<str>],
        downstream: ObserverRef<T, E>,
        bus: Bus,
        demand_events: bool,
    ) -> Self {
        let slots = sources
            .iter()
            .enumerate()
            .map(|(index, name)| CandidateSlot::new(index, Arc::clone(name)))
            .collect();
        Self {
            id,
            label,
            slots,
            winner: WinnerCell::new(),
            phase: AtomicU8::new(OPEN),
            ledger: DemandLedger::new(),
            downstream: Mutex::new(Some(downstream)),
            bus,
            demand_events,
        }
    }

    /// Entry point for every value, error and completion of every candidate.
    pub(crate) fn on_signal(&self, index: usize, signal: Signal<T, E>) {
        match self.winner.claim(index) {
            Claim::Decided => {
                for slot in self.slots.iter().filter(|s| s.index() != index) {
                    self.sever(slot);
                }
                let kind = signal.kind();
                self.publish(|| {
                    self.candidate_event(EventKind::WinnerDecided, index)
                        .with_signal(kind)
                });
                self.relay(index, signal);
            }
            Claim::AlreadyWinner => self.relay(index, signal),
            Claim::Lost => self.discard(index, signal.kind()),
        }
    }

    /// Records the producer a candidate handed over and replays its pending demand.
    pub(crate) fn attach_producer(&self, index: usize, producer: ProducerRef) {
        let slot = &self.slots[index];
        if !self.winner.admits(index) {
            self.reject_producer(slot, producer);
            return;
        }

        let handle = Arc::clone(&producer);
        match slot.attach_producer(producer) {
            AttachProducer::Attached { replay } => {
                if !self.winner.admits(index) {
                    self.sever(slot);
                } else if !replay.is_zero() {
                    handle.request(replay);
                }
            }
            AttachProducer::Rejected(producer) => self.reject_producer(slot, producer),
            AttachProducer::Duplicate(producer) => {
                let _ = isolate(|| {
                    producer.cancel();
                    Ok(())
                });
                self.publish(|| {
                    self.candidate_event(EventKind::ProtocolViolation, index)
                        .with_reason("duplicate producer")
                });
            }
        }
    }

    /// Stores the subscription returned by a candidate's `subscribe` call.
    pub(crate) fn attach_subscription(&self, index: usize, subscription: SubscriptionRef) {
        let slot = &self.slots[index];
        match slot.attach_subscription(subscription) {
            Some(late) => self.cancel_subscription(slot, late),
            None if !self.winner.admits(index) => self.sever(slot),
            None => {}
        }
    }

    /// Downstream demand.
    pub(crate) fn request(&self, n: Demand) {
        if n.is_zero() || self.phase.load(Ordering::Acquire) != OPEN {
            return;
        }
        let outstanding = self.ledger.grant(n);
        if self.demand_events {
            self.publish(|| {
                self.event(EventKind::DemandRequested)
                    .with_demand(n)
                    .with_reason(format!("outstanding={outstanding}"))
            });
        }
        self.ledger.dispatch(n, &self.winner, &self.slots);
    }

    /// Downstream cancellation.
    ///
    /// Undecided: severs every candidate and settles the winner cell as cancelled.
    /// Decided: severs the winner only. Idempotent.
    pub(crate) fn cancel(&self) {
        match self.winner.cancel() {
            Ok(()) => {
                self.phase.store(CANCELLED, Ordering::Release);
                for slot in self.slots.iter() {
                    self.sever(slot);
                }
                drop(self.detach_downstream());
                self.publish(|| self.event(EventKind::RaceCancelled));
            }
            Err(Decision::Winner(index)) => {
                if self
                    .phase
                    .compare_exchange(OPEN, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    self.sever(&self.slots[index]);
                    drop(self.detach_downstream());
                    self.publish(|| {
                        self.event(EventKind::RaceCancelled)
                            .with_candidate(index)
                    });
                }
            }
            Err(_) => {}
        }
    }

    /// Publishes an event about candidate `index`.
    pub(crate) fn publish_candidate(&self, kind: EventKind, index: usize) {
        self.publish(|| self.candidate_event(kind, index));
    }

    /// Publishes the start of this race.
    pub(crate) fn publish_started(&self) {
        let candidates = self.slots.len();
        self.publish(|| {
            self.event(EventKind::RaceStarted)
                .with_reason(format!("candidates={candidates}"))
        });
    }

    fn relay(&self, index: usize, signal: Signal<T, E>) {
        let kind = signal.kind();
        match self.phase.load(Ordering::Acquire) {
            OPEN => {}
            FINISHED => return self.violation(index, kind),
            _ => return self.discard(index, kind),
        }

        match signal {
            Signal::Next(value) => {
                let Some(downstream) = self.downstream.lock().clone() else {
                    return self.discard(index, kind);
                };
                self.ledger.consume_one();
                downstream.on_next(value);
            }
            Signal::Error(error) => {
                if let Some(downstream) = self.finish(index, kind) {
                    downstream.on_error(error);
                    self.publish_finished(index, kind);
                }
            }
            Signal::Complete => {
                if let Some(downstream) = self.finish(index, kind) {
                    downstream.on_complete();
                    self.publish_finished(index, kind);
                }
            }
        }
    }

    /// Moves OPEN → FINISHED; only the caller that wins this transition gets the
    /// downstream back, detached from the coordinator.
    fn finish(&self, index: usize, kind: SignalKind) -> Option<ObserverRef<T, E>> {
        match self
            .phase
            .compare_exchange(OPEN, FINISHED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                drop(self.slots[index].release());
                self.detach_downstream()
            }
            Err(FINISHED) => {
                self.violation(index, kind);
                None
            }
            Err(_) => {
                self.discard(index, kind);
                None
            }
        }
    }

    fn detach_downstream(&self) -> Option<ObserverRef<T, E>> {
        self.downstream.lock().take()
    }

    fn sever(&self, slot: &CandidateSlot) {
        let Some(severance) = slot.sever() else {
            return;
        };
        if let Some(producer) = severance.producer {
            let _ = isolate(|| {
                producer.cancel();
                Ok(())
            });
        }
        if let Some(subscription) = severance.subscription {
            self.cancel_subscription(slot, subscription);
        }
        self.publish(|| self.candidate_event(EventKind::CandidateSevered, slot.index()));
    }

    fn cancel_subscription(&self, slot: &CandidateSlot, subscription: SubscriptionRef) {
        if let Err(err) = isolate(|| subscription.cancel()) {
            self.publish(|| {
                self.candidate_event(EventKind::SeverFailed, slot.index())
                    .with_reason(err.as_message())
            });
        }
    }

    fn reject_producer(&self, slot: &CandidateSlot, producer: ProducerRef) {
        let _ = isolate(|| {
            producer.cancel();
            Ok(())
        });
        self.publish(|| self.candidate_event(EventKind::ProducerRejected, slot.index()));
    }

    fn discard(&self, index: usize, kind: SignalKind) {
        self.publish(|| {
            self.candidate_event(EventKind::ResidualDiscarded, index)
                .with_signal(kind)
        });
    }

    fn violation(&self, index: usize, kind: SignalKind) {
        self.publish(|| {
            self.candidate_event(EventKind::ProtocolViolation, index)
                .with_signal(kind)
                .with_reason("signal after terminal")
        });
    }

    fn publish_finished(&self, index: usize, kind: SignalKind) {
        self.publish(|| {
            self.candidate_event(EventKind::RaceFinished, index)
                .with_signal(kind)
        });
    }

    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_race(self.id, Arc::clone(&self.label))
    }

    fn candidate_event(&self, kind: EventKind, index: usize) -> Event {
        self.event(kind)
            .with_candidate(index)
            .with_source(Arc::clone(self.slots[index].source()))
    }

    /// Builds and publishes an event only when somebody listens.
    #[inline]
    fn publish(&self, build: impl FnOnce() -> Event) {
        if self.bus.has_listeners() {
            self.bus.publish(build());
        }
    }
}

/// Runs a cancellation callback, turning a panic into [`SeverError::Panicked`].
fn isolate(cancel: impl FnOnce() -> Result<(), SeverError>) -> Result<(), SeverError> {
    catch_unwind(AssertUnwindSafe(cancel)).unwrap_or_else(|payload| {
        Err(SeverError::Panicked {
            info: panic_info(payload.as_ref()),
        })
    })
}
