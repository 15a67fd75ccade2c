//! Trailing-edge debouncer owned by its caller.
//!
//! Each [`Debouncer::call`] replaces the pending value and restarts the
//! timer; only the last value of a burst is applied. Timers are tied to a
//! [`CancellationToken`] owned by the debouncer, so dropping it (or calling
//! [`cancel`](Debouncer::cancel)) guarantees nothing is applied afterwards.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

type Apply<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Pending<T> {
    id: u64,
    value: T,
    timer: CancellationToken,
}

struct State<T> {
    pending: Option<Pending<T>>,
    next_id: u64,
}

pub struct Debouncer<T: Send + 'static> {
    delay: Duration,
    apply: Apply<T>,
    state: Arc<Mutex<State<T>>>,
    lifetime: CancellationToken,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer that hands the last value of each burst to
    /// `apply` once `delay` has passed without a new call.
    pub fn new(delay: Duration, apply: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            apply: Arc::new(apply),
            state: Arc::new(Mutex::new(State {
                pending: None,
                next_id: 0,
            })),
            lifetime: CancellationToken::new(),
        }
    }

    /// Schedule `value`, replacing any value still waiting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn call(&self, value: T) {
        let (id, timer) = {
            let mut state = lock(&self.state);
            if let Some(previous) = state.pending.take() {
                previous.timer.cancel();
            }
            let id = state.next_id;
            state.next_id += 1;
            let timer = self.lifetime.child_token();
            state.pending = Some(Pending {
                id,
                value,
                timer: timer.clone(),
            });
            (id, timer)
        };

        let state = Arc::clone(&self.state);
        let apply = Arc::clone(&self.apply);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    // Applied under the lock so a concurrent flush cannot
                    // overtake it.
                    let mut state = lock(&state);
                    match state.pending.take() {
                        Some(pending) if pending.id == id => apply(pending.value),
                        other => state.pending = other,
                    }
                }
            }
        });
    }

    /// Apply the pending value now, if any. Returns whether one was applied.
    pub fn flush(&self) -> bool {
        let mut state = lock(&self.state);
        match state.pending.take() {
            Some(pending) => {
                pending.timer.cancel();
                (self.apply)(pending.value);
                true
            }
            None => false,
        }
    }

    /// Discard the pending value, if any.
    pub fn cancel(&self) {
        if let Some(pending) = lock(&self.state).pending.take() {
            pending.timer.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.state).pending.is_some()
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.lifetime.cancel();
        lock(&self.state).pending = None;
    }
}

fn lock<T>(state: &Mutex<State<T>>) -> MutexGuard<'_, State<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
