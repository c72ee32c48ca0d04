//! # Monitor: bus listener feeding the subscriber set.
//!
//! ```text
//! Bus ──► listener task ──► SubscriberSet::emit_arc(event)
//!            │  Lagged(n) ─► ListenerLagged event to subscribers
//!            │  Closed    ─► stop
//!            └─ token cancelled ─► drain buffered events ─► stop
//!                                                            └─► SubscriberSet::shutdown()
//! ```
//!
//! The listener only exists when an [`Amb`](crate::Amb) was built with subscribers.
//! Dropping the monitor (with its `Amb`) cancels the token, so the listener never
//! outlives the race definition that spawned it.

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};

pub(crate) struct Monitor {
    token: CancellationToken,
    listener: JoinHandle<()>,
}

impl Monitor {
    /// Spawns subscriber workers and the bus listener on the current runtime.
    pub(crate) fn spawn(bus: &Bus, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let set = SubscriberSet::new(subscribers, bus.clone());
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();
        let stop = token.clone();

        let listener = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit_arc(Arc::new(ev)),
                        Err(RecvError::Lagged(skipped)) => {
                            set.emit(
                                &Event::new(EventKind::ListenerLagged)
                                    .with_reason(format!("skipped={skipped}")),
                            );
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => {
                        loop {
                            match rx.try_recv() {
                                Ok(ev) => set.emit_arc(Arc::new(ev)),
                                Err(TryRecvError::Lagged(_)) => continue,
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
            set.shutdown().await;
        });

        Self { token, listener }
    }

    /// Stops the listener after draining buffered events and waits for subscriber
    /// workers to finish their queues.
    pub(crate) async fn shutdown(mut self) {
        self.token.cancel();
        let _ = (&mut self.listener).await;
    }
}

impl Drop for Monitor {
    /// Lets the listener drain and stop on its own when nobody awaited shutdown.
    fn drop(&mut self) {
        self.token.cancel();
    }
}
