use std::time::Duration;

use crate::timing::Debounce;
use crate::timing::Throttle;

/// Idle timer restarted by user activity.
///
/// Activity bursts (pointer moves, scrolling) are throttled so the timer is
/// restarted at most once per throttle window.
#[derive(Debug)]
pub struct InactivityWatch {
    timer: Debounce,
    throttle: Throttle,
}

impl InactivityWatch {
    pub fn new(timeout: Duration, activity_throttle: Duration) -> Self {
        Self {
            timer: Debounce::new(timeout),
            throttle: Throttle::new(activity_throttle),
        }
    }

    /// Returns true if the timer was restarted.
    pub fn activity<F>(&mut self, on_idle: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.throttle.try_acquire() {
            return false;
        }
        self.timer.call(on_idle);
        true
    }

    /// Restart unconditionally, e.g. after the user chose to stay signed in.
    pub fn restart<F>(&mut self, on_idle: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.throttle.reset();
        self.throttle.try_acquire();
        self.timer.call(on_idle);
    }

    pub fn stop(&mut self) {
        self.timer.cancel();
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_pending()
    }
}
