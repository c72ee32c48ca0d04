//! # LogWriter: structured `tracing` output of race events
//!
//! Emits one `tracing` event per bus event under the `racevisor` target.
//!
//! ## Levels
//! - `debug`: subscriptions, severance, demand, residual discards
//! - `info`: race start, winner decision, finish, cancellation
//! - `warn`: sever failures, rejected producers, protocol violations, subscriber trouble
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO racevisor: winner_decided race_id=3 race="lookup" candidate=1 source="replica-b" signal="next"
//! WARN racevisor: sever_failed race_id=3 race="lookup" candidate=0 source="replica-a" reason="refused: busy"
//! ```

use async_trait::async_trait;
use tracing::{Level, debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber forwarding events to `tracing`.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn level(kind: EventKind) -> Level {
        match kind {
            EventKind::RaceStarted
            | EventKind::WinnerDecided
            | EventKind::RaceFinished
            | EventKind::RaceCancelled => Level::INFO,
            EventKind::SeverFailed
            | EventKind::ProducerRejected
            | EventKind::ProtocolViolation
            | EventKind::SubscriberOverflow
            | EventKind::SubscriberPanicked
            | EventKind::ListenerLagged => Level::WARN,
            EventKind::CandidateSubscribed
            | EventKind::SubscribeFailed
            | EventKind::CandidateSevered
            | EventKind::ResidualDiscarded
            | EventKind::DemandRequested => Level::DEBUG,
        }
    }
}

macro_rules! emit {
    ($mac:ident, $e:expr) => {
        $mac!(
            target: "racevisor",
            seq = $e.seq,
            race_id = $e.race_id,
            race = $e.race.as_deref(),
            candidate = $e.candidate,
            source = $e.source.as_deref(),
            signal = $e.signal.map(|s| s.as_label()),
            demand = $e.demand.map(|d| d.get()),
            subscriber = $e.subscriber,
            reason = $e.reason.as_deref(),
            "{}",
            $e.kind.as_label()
        )
    };
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let level = Self::level(e.kind);
        if level == Level::WARN {
            emit!(warn, e);
        } else if level == Level::INFO {
            emit!(info, e);
        } else {
            emit!(debug, e);
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
