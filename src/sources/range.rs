//! # Range: cold, demand-honouring integer source
//!
//! Each subscription gets its own producer that emits `start, start + 1, ...` only
//! as far as the observer has requested, then completes.
//!
//! ```text
//! subscribe(obs) ──► obs.on_producer(p)     (observer may request right here)
//!                └─► count == 0 ? on_complete
//!
//! request(n) ──► requested += n ──► wip 0→1 ? drain : (running drain picks it up)
//! drain: while emitted < requested && !cancelled { on_next(i) }
//!        last value emitted ─► on_complete
//! ```
//!
//! Emission happens on the thread that requested. Re-entrant `request` calls from
//! inside `on_next` only bump counters; the running drain loop delivers them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::SeverError;
use crate::flow::{Demand, ObserverRef, Producer, Source, Subscription, SubscriptionRef};

/// Emits `count` consecutive integers from `start`, honouring demand.
#[derive(Debug, Clone)]
pub struct Range {
    name: Arc<str>,
    start: u64,
    count: u64,
}

impl Range {
    pub fn new(start: u64, count: u64) -> Self {
        Self::named("range", start, count)
    }

    pub fn named(name: impl Into<Arc<str>>, start: u64, count: u64) -> Self {
        Self {
            name: name.into(),
            start,
            count,
        }
    }
}

impl<E> Source<u64, E> for Range
where
    E: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn subscribe(&self, observer: ObserverRef<u64, E>) -> Result<SubscriptionRef, E> {
        let producer = Arc::new(RangeProducer {
            observer,
            next: AtomicU64::new(self.start),
            end: self.start.saturating_add(self.count),
            requested: AtomicU64::new(0),
            wip: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            done: AtomicBool::new(false),
        });
        producer.observer.on_producer(producer.clone());
        if self.count == 0 {
            producer.finish();
        }
        Ok(Box::new(RangeSubscription(producer)))
    }
}

struct RangeProducer<E> {
    observer: ObserverRef<u64, E>,
    next: AtomicU64,
    end: u64,
    requested: AtomicU64,
    wip: AtomicU64,
    cancelled: AtomicBool,
    done: AtomicBool,
}

impl<E> RangeProducer<E>
where
    E: Send + 'static,
{
    fn add_demand(&self, n: Demand) {
        let mut current = self.requested.load(Ordering::Acquire);
        loop {
            let next = Demand::new(current).saturating_add(n).get();
            match self.requested.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    fn drain(&self) {
        let mut missed = 1;
        loop {
            let requested = self.requested.load(Ordering::Acquire);
            let mut emitted = 0u64;

            while emitted != requested {
                if self.is_stopped() {
                    return;
                }
                let value = self.next.load(Ordering::Relaxed);
                if value == self.end {
                    break;
                }
                self.next.store(value + 1, Ordering::Relaxed);
                self.observer.on_next(value);
                emitted += 1;
            }

            if self.next.load(Ordering::Relaxed) == self.end {
                self.finish();
                return;
            }
            if requested != u64::MAX {
                self.requested.fetch_sub(emitted, Ordering::AcqRel);
            }

            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                return;
            }
        }
    }

    fn finish(&self) {
        if self.cancelled.load(Ordering::Acquire) {
            return;
        }
        if !self.done.swap(true, Ordering::AcqRel) {
            self.observer.on_complete();
        }
    }

    fn is_stopped(&self) -> bool {
        self.cancelled.load(Ordering::Acquire) || self.done.load(Ordering::Acquire)
    }
}

impl<E> Producer for RangeProducer<E>
where
    E: Send + 'static,
{
    fn request(&self, n: Demand) {
        if n.is_zero() || self.is_stopped() {
            return;
        }
        self.add_demand(n);
        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            self.drain();
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

struct RangeSubscription<E>(Arc<RangeProducer<E>>);

impl<E> Subscription for RangeSubscription<E>
where
    E: Send + 'static,
{
    fn cancel(&self) -> Result<(), SeverError> {
        Producer::cancel(self.0.as_ref());
        Ok(())
    }
}
