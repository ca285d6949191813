//! Debounce and throttle helpers built on tokio timers.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Runs a callback once calls stop arriving for `wait`.
///
/// Each [`Debounce::call`] cancels the timer started by the previous one. In
/// leading-edge mode the callback runs on the first call of a burst instead,
/// and further calls only extend the quiet window. Must be used from within a
/// tokio runtime; dropping the value cancels any pending callback.
#[derive(Debug)]
pub struct Debounce {
    wait: Duration,
    leading: bool,
    pending: Option<JoinHandle<()>>,
}

impl Debounce {
    /// Trailing-edge debounce.
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            leading: false,
            pending: None,
        }
    }

    /// Leading-edge debounce.
    pub fn immediate(wait: Duration) -> Self {
        Self {
            wait,
            leading: true,
            pending: None,
        }
    }

    /// True while a quiet window is open.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn call<F>(&mut self, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let window_open = self.is_pending();
        self.cancel();
        let wait = self.wait;
        if self.leading {
            self.pending = Some(tokio::spawn(async move {
                tokio::time::sleep(wait).await;
            }));
            if !window_open {
                fire();
            }
        } else {
            self.pending = Some(tokio::spawn(async move {
                tokio::time::sleep(wait).await;
                fire();
            }));
        }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Admits at most one call per `limit`.
#[derive(Debug, Clone)]
pub struct Throttle {
    limit: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(limit: Duration) -> Self {
        Self { limit, last: None }
    }

    /// Returns true when the caller may proceed; the window starts now.
    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.limit => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
