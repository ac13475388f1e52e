//! Lifecycle simulator
//!
//! One-shot deferred transitions keyed by resource id. Each armed timer is a
//! tokio task on the runtime captured at construction; re-arming an id or
//! cancelling it aborts the previous task.

use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::debug;

struct Timer {
    token: u64,
    abort: AbortHandle,
}

/// Deferred one-shot callbacks, at most one pending per id
pub struct LifecycleSimulator {
    handle: Handle,
    timers: Arc<Mutex<HashMap<String, Timer>>>,
    next_token: AtomicU64,
}

impl LifecycleSimulator {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            timers: Arc::new(Mutex::new(HashMap::new())),
            next_token: AtomicU64::new(0),
        }
    }

    /// Bind to the runtime the caller is running on
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| Error::NoRuntime)
    }

    /// Run `fire` once after `delay`, replacing any timer already armed for `id`.
    pub fn arm<F>(&self, id: &str, delay: Duration, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let timers = Arc::clone(&self.timers);
        let key = id.to_string();

        // Held across spawn so a zero-delay task cannot finish before it is registered.
        let mut guard = self.timers.lock();
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut timers = timers.lock();
                match timers.get(&key) {
                    Some(timer) if timer.token == token => {
                        timers.remove(&key);
                    }
                    // Superseded or cancelled while waking up.
                    _ => return,
                }
            }
            fire();
        });

        let timer = Timer {
            token,
            abort: task.abort_handle(),
        };
        if let Some(previous) = guard.insert(id.to_string(), timer) {
            previous.abort.abort();
            debug!("Re-armed lifecycle timer for {}", id);
        } else {
            debug!("Armed lifecycle timer for {} ({:?})", id, delay);
        }
    }

    /// Abort the timer armed for `id`. Returns whether one was pending.
    pub fn cancel(&self, id: &str) -> bool {
        match self.timers.lock().remove(id) {
            Some(timer) => {
                timer.abort.abort();
                debug!("Cancelled lifecycle timer for {}", id);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for (_, timer) in self.timers.lock().drain() {
            timer.abort.abort();
        }
    }

    pub fn is_armed(&self, id: &str) -> bool {
        self.timers.lock().contains_key(id)
    }

    /// Number of timers that have not fired yet
    pub fn pending(&self) -> usize {
        self.timers.lock().len()
    }
}

impl Drop for LifecycleSimulator {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
