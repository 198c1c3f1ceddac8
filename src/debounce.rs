//! Single-slot debouncing.
//!
//! A [`Debouncer`] holds at most one pending value. Scheduling a new value
//! replaces the pending one and restarts the delay, so a burst of events
//! collapses into the last one. Time is passed in explicitly so the session
//! can be driven deterministically from an event loop or a test.

use std::time::Duration;
use web_time::Instant;

/// Pending value with the instant it becomes due.
#[derive(Debug, Clone, PartialEq)]
struct Pending<T> {
    value: T,
    due: Instant,
}

/// Coalesces rapid events into the most recent one.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing anything pending. Returns true if an
    /// earlier value was superseded.
    pub fn schedule(&mut self, value: T, now: Instant) -> bool {
        let superseded = self.pending.is_some();
        self.pending = Some(Pending {
            value,
            due: now + self.delay,
        });
        if superseded {
            log::trace!("Debounce: pending value replaced");
        }
        superseded
    }

    /// Take the pending value if its delay has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if now >= p.due => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Drop the pending value without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due.
    pub fn due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }
}
