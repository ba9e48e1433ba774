//! Cancellable debounce timer.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// The currently armed timer.
struct Armed {
    ticket: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Slot {
    armed: Option<Armed>,
    next_ticket: u64,
}

/// A single-slot timer: arming it replaces whatever was armed before.
///
/// Each arm gets a ticket. When the delay elapses the timer only fires if its
/// ticket is still the armed one, so a timer that loses a race with
/// [`cancel`](Debouncer::cancel) or a newer [`arm`](Debouncer::arm) never runs.
/// All timers are children of the `parent` token; cancelling it disarms them.
pub struct Debouncer {
    delay: Duration,
    runtime: Handle,
    parent: CancellationToken,
    slot: Arc<Mutex<Slot>>,
}

impl Debouncer {
    /// Creates a debouncer spawning its timers on `runtime`.
    pub fn new(delay: Duration, runtime: Handle, parent: CancellationToken) -> Self {
        Self {
            delay,
            runtime,
            parent,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Arms the timer, cancelling the previous one. `fire` runs once the delay
    /// elapses without another `arm` or `cancel`.
    pub fn arm<F>(&self, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.parent.is_cancelled() {
            return;
        }

        let cancel = self.parent.child_token();
        let ticket = {
            let Ok(mut slot) = self.slot.lock() else {
                return;
            };
            slot.next_ticket += 1;
            let ticket = slot.next_ticket;
            if let Some(previous) = slot.armed.replace(Armed {
                ticket,
                cancel: cancel.clone(),
            }) {
                previous.cancel.cancel();
            }
            ticket
        };

        let slot = Arc::clone(&self.slot);
        let delay = self.delay;
        self.runtime.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let still_armed = match slot.lock() {
                        Ok(mut slot) => {
                            if slot.armed.as_ref().is_some_and(|armed| armed.ticket == ticket) {
                                slot.armed = None;
                                true
                            } else {
                                false
                            }
                        }
                        Err(_) => false,
                    };
                    if still_armed {
                        fire();
                    }
                }
            }
        });
    }

    /// Cancels the armed timer. Returns `true` if one was armed.
    pub fn cancel(&self) -> bool {
        let armed = match self.slot.lock() {
            Ok(mut slot) => slot.armed.take(),
            Err(_) => None,
        };
        match armed {
            Some(armed) => {
                armed.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Returns `true` while a timer is waiting to fire.
    pub fn is_armed(&self) -> bool {
        self.slot
            .lock()
            .map(|slot| {
                slot.armed
                    .as_ref()
                    .is_some_and(|armed| !armed.cancel.is_cancelled())
            })
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("armed", &self.is_armed())
            .finish_non_exhaustive()
    }
}
