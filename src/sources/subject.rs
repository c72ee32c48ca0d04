//! # Subject: hot, manually driven multicast source
//!
//! A [`Subject`] forwards every `next`/`error`/`complete` call to the observers
//! attached at that moment. It ignores demand. After a terminal signal it keeps the
//! terminal and replays it to late subscribers.
//!
//! ```text
//! subject.next(v) ──► snapshot observers (lock released) ──► on_next(v.clone()) each
//! subscribe(obs)  ──► terminated? replay terminal : register under a fresh id
//! cancel()        ──► remove id (has_observers() turns false once all left)
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::SeverError;
use crate::flow::{ObserverRef, Source, Subscription, SubscriptionRef};

enum Terminal<E> {
    Error(E),
    Complete,
}

struct SubjectState<T, E> {
    next_id: u64,
    observers: Vec<(u64, ObserverRef<T, E>)>,
    terminal: Option<Terminal<E>>,
}

/// Hot source driven by explicit calls.
pub struct Subject<T, E> {
    name: Arc<str>,
    state: Arc<Mutex<SubjectState<T, E>>>,
}

impl<T, E> Subject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self::named("subject")
    }

    /// Creates a subject reporting `name` in race events.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(SubjectState {
                next_id: 0,
                observers: Vec::new(),
                terminal: None,
            })),
        }
    }

    /// Emits a value to every current observer. Ignored after a terminal signal.
    pub fn next(&self, value: T) {
        let observers = {
            let st = self.state.lock();
            if st.terminal.is_some() {
                return;
            }
            st.observers.iter().map(|(_, o)| Arc::clone(o)).collect::<Vec<_>>()
        };
        for observer in observers {
            observer.on_next(value.clone());
        }
    }

    /// Terminates with `error`. Only the first terminal call has an effect.
    pub fn error(&self, error: E) {
        for observer in self.terminate(Terminal::Error(error.clone())) {
            observer.on_error(error.clone());
        }
    }

    /// Terminates successfully. Only the first terminal call has an effect.
    pub fn complete(&self) {
        for observer in self.terminate(Terminal::Complete) {
            observer.on_complete();
        }
    }

    /// Returns `true` while at least one observer is attached.
    pub fn has_observers(&self) -> bool {
        !self.state.lock().observers.is_empty()
    }

    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    pub fn is_terminated(&self) -> bool {
        self.state.lock().terminal.is_some()
    }

    fn terminate(&self, terminal: Terminal<E>) -> Vec<ObserverRef<T, E>> {
        let mut st = self.state.lock();
        if st.terminal.is_some() {
            return Vec::new();
        }
        st.terminal = Some(terminal);
        std::mem::take(&mut st.observers)
            .into_iter()
            .map(|(_, o)| o)
            .collect()
    }
}

impl<T, E> Default for Subject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Source<T, E> for Subject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn subscribe(&self, observer: ObserverRef<T, E>) -> Result<SubscriptionRef, E> {
        let replay = {
            let mut st = self.state.lock();
            match &st.terminal {
                Some(Terminal::Error(e)) => Terminal::Error(e.clone()),
                Some(Terminal::Complete) => Terminal::Complete,
                None => {
                    let id = st.next_id;
                    st.next_id += 1;
                    st.observers.push((id, observer));
                    return Ok(Box::new(SubjectSubscription {
                        state: Arc::clone(&self.state),
                        id,
                    }));
                }
            }
        };
        match replay {
            Terminal::Error(e) => observer.on_error(e),
            Terminal::Complete => observer.on_complete(),
        }
        Ok(Box::new(Detached))
    }
}

struct SubjectSubscription<T, E> {
    state: Arc<Mutex<SubjectState<T, E>>>,
    id: u64,
}

impl<T, E> Subscription for SubjectSubscription<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn cancel(&self) -> Result<(), SeverError> {
        self.state.lock().observers.retain(|(id, _)| *id != self.id);
        Ok(())
    }
}

/// Subscription of an observer that was never registered.
struct Detached;

impl Subscription for Detached {
    fn cancel(&self) -> Result<(), SeverError> {
        Ok(())
    }
}
