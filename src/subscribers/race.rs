//! # RaceTracker: per-race outcome tracking with sequence-based ordering.
//!
//! Follows every race published on the bus and records how it ended.
//!
//! ```text
//! Bus ──► Monitor ──► RaceTracker::on_event() ──► update()
//!                                                    │
//!                                                    ▼
//!                                      HashMap<race_id, RaceState>
//!                                        (id → {last_seq, status})
//!                                                    │ Finished / Cancelled
//!                                                    ▼
//!                                      VecDeque<race_id> of ended races
//!                                        (oldest evicted beyond `retained`)
//! ```
//!
//! ## Rules
//! - `RaceStarted` → `Pending`, `WinnerDecided` → `Decided(i)`,
//!   `RaceFinished` → `Finished(i)`, `RaceCancelled` → `Cancelled`
//! - Events with `seq <= last_seq` for a race are **rejected** (stale)
//! - Other race events only advance `last_seq` of a known race; they never create one
//! - Only the most recent `retained` ended races are kept, so a long-lived `Amb`
//!   running many races keeps a bounded map

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Observed outcome of one race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceStatus {
    /// Started, no winner yet.
    Pending,
    /// Winner chosen, terminal signal not yet relayed.
    Decided(usize),
    /// Winner's terminal signal relayed.
    Finished(usize),
    /// Cancelled by the downstream.
    Cancelled,
}

#[derive(Debug, Clone)]
struct RaceState {
    last_seq: u64,
    status: RaceStatus,
}

#[derive(Default)]
struct Tracked {
    races: HashMap<u64, RaceState>,
    ended: VecDeque<u64>,
}

impl Tracked {
    /// Remembers `id` as ended and evicts the oldest ended races beyond `retained`.
    fn retire(&mut self, id: u64, retained: usize) {
        self.ended.push_back(id);
        while self.ended.len() > retained {
            if let Some(old) = self.ended.pop_front() {
                self.races.remove(&old);
            }
        }
    }
}

/// Subscriber that tracks live races and the most recently ended ones.
pub struct RaceTracker {
    state: RwLock<Tracked>,
    capacity: usize,
    retained: usize,
}

impl RaceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Tracked::default()),
            capacity: 2048,
            retained: 1024,
        }
    }

    /// Configure how many ended races stay queryable (0 forgets them at once).
    #[must_use]
    pub fn with_retained(mut self, retained: usize) -> Self {
        self.retained = retained;
        self
    }

    /// Configure the queue capacity for this subscriber.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Applies a race event if it is newer than the last one seen for that race.
    ///
    /// Returns `true` if the status changed.
    pub async fn update(&self, ev: &Event) -> bool {
        let Some(id) = ev.race_id else {
            return false;
        };

        let next = match (ev.kind, ev.candidate) {
            (EventKind::RaceStarted, _) => Some(RaceStatus::Pending),
            (EventKind::WinnerDecided, Some(i)) => Some(RaceStatus::Decided(i)),
            (EventKind::RaceFinished, Some(i)) => Some(RaceStatus::Finished(i)),
            (EventKind::RaceCancelled, _) => Some(RaceStatus::Cancelled),
            _ => None,
        };

        let mut state = self.state.write().await;
        if next.is_none() && !state.races.contains_key(&id) {
            return false;
        }
        let entry = state.races.entry(id).or_insert(RaceState {
            last_seq: 0,
            status: RaceStatus::Pending,
        });
        if ev.seq <= entry.last_seq {
            return false;
        }
        entry.last_seq = ev.seq;

        let Some(next) = next else {
            return false;
        };
        let changed = entry.status != next;
        entry.status = next;
        if changed && matches!(next, RaceStatus::Finished(_) | RaceStatus::Cancelled) {
            state.retire(id, self.retained);
        }
        changed
    }

    /// Number of races currently held (live plus retained ended ones).
    pub async fn tracked(&self) -> usize {
        self.state.read().await.races.len()
    }

    /// Returns the status of a race, if it was seen.
    pub async fn status(&self, race_id: u64) -> Option<RaceStatus> {
        self.state.read().await.races.get(&race_id).map(|s| s.status)
    }

    /// Returns the winner of a race once decided (also after it finished).
    pub async fn winner_of(&self, race_id: u64) -> Option<usize> {
        match self.status(race_id).await? {
            RaceStatus::Decided(i) | RaceStatus::Finished(i) => Some(i),
            RaceStatus::Pending | RaceStatus::Cancelled => None,
        }
    }

    pub async fn is_decided(&self, race_id: u64) -> bool {
        self.winner_of(race_id).await.is_some()
    }

    /// Returns the sorted ids of races that have no winner yet.
    pub async fn snapshot(&self) -> Vec<u64> {
        let state = self.state.read().await;
        let mut pending: Vec<u64> = state
            .races
            .iter()
            .filter(|(_, rs)| rs.status == RaceStatus::Pending)
            .map(|(id, _)| *id)
            .collect();
        pending.sort_unstable();
        pending
    }
}

impl Default for RaceTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for RaceTracker {
    async fn on_event(&self, ev: &Event) {
        self.update(ev).await;
    }

    fn name(&self) -> &'static str {
        "RaceTracker"
    }

    fn queue_capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(kind: EventKind, race: u64) -> Event {
        Event::new(kind).with_race(race, "r")
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let t = RaceTracker::new();
        assert!(!t.update(&ev(EventKind::RaceStarted, 1)).await);
        assert_eq!(t.snapshot().await, vec![1]);

        assert!(t.update(&ev(EventKind::WinnerDecided, 1).with_candidate(2)).await);
        assert_eq!(t.winner_of(1).await, Some(2));
        assert!(t.snapshot().await.is_empty());

        assert!(t.update(&ev(EventKind::RaceFinished, 1).with_candidate(2)).await);
        assert_eq!(t.status(1).await, Some(RaceStatus::Finished(2)));
        assert!(t.is_decided(1).await);
    }

    #[tokio::test]
    async fn test_stale_event_is_rejected() {
        let t = RaceTracker::new();
        let started = ev(EventKind::RaceStarted, 5);
        let cancelled = ev(EventKind::RaceCancelled, 5);

        assert!(t.update(&cancelled).await);
        assert!(!t.update(&started).await);
        assert_eq!(t.status(5).await, Some(RaceStatus::Cancelled));
        assert_eq!(t.winner_of(5).await, None);
    }

    #[tokio::test]
    async fn test_ended_races_are_evicted_beyond_retention() {
        let t = RaceTracker::new().with_retained(2);
        for race in 1..=100 {
            t.update(&ev(EventKind::RaceStarted, race)).await;
            t.update(&ev(EventKind::WinnerDecided, race).with_candidate(0))
                .await;
            t.update(&ev(EventKind::RaceFinished, race).with_candidate(0))
                .await;
        }
        t.update(&ev(EventKind::RaceStarted, 101)).await;

        assert_eq!(t.tracked().await, 3);
        assert_eq!(t.winner_of(100).await, Some(0));
        assert_eq!(t.winner_of(99).await, Some(0));
        assert_eq!(t.status(98).await, None);
        assert_eq!(t.snapshot().await, vec![101]);
    }

    #[tokio::test]
    async fn test_trailing_events_do_not_revive_evicted_races() {
        let t = RaceTracker::new().with_retained(0);
        t.update(&ev(EventKind::RaceStarted, 7)).await;
        assert!(t.update(&ev(EventKind::RaceCancelled, 7)).await);
        assert_eq!(t.status(7).await, None);

        assert!(!t.update(&ev(EventKind::ResidualDiscarded, 7).with_candidate(1)).await);
        assert_eq!(t.tracked().await, 0);
    }

    #[tokio::test]
    async fn test_events_without_race_are_ignored() {
        let t = RaceTracker::new();
        assert!(!t.update(&Event::new(EventKind::ListenerLagged)).await);
        assert_eq!(t.status(0).await, None);
    }
}
