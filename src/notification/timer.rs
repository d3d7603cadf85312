//! Timer bookkeeping for notification expiry
//!
//! Time is read through a [`Clock`] so the queue can run against the real
//! monotonic clock or a simulated one. Outstanding expiry timers live in a
//! [`TimerTable`]: one entry per queued notification, indexed by deadline so
//! due timers fire in deadline order.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::id::NotificationId;

/// Source of "now", measured from the clock's own epoch.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Monotonic wall clock; its epoch is the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Simulated clock with nanosecond resolution.
///
/// Clones share the same time, so a test can keep one handle and advance it
/// while the queue owns another. Time saturates at `u64::MAX` nanoseconds
/// (about 584 years) instead of wrapping.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ns: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let by = saturating_nanos(by);
        // Closure always returns Some, so this cannot fail
        let _ = self
            .now_ns
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(by))
            });
    }

    pub fn set(&self, at: Duration) {
        self.now_ns.store(saturating_nanos(at), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.now_ns.load(Ordering::SeqCst))
    }
}

fn saturating_nanos(value: Duration) -> u64 {
    u64::try_from(value.as_nanos()).unwrap_or(u64::MAX)
}

/// A scheduled expiry. `seq` orders timers that share a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    pub deadline: Duration,
    seq: u64,
}

impl TimerHandle {
    fn key(self) -> (Duration, u64) {
        (self.deadline, self.seq)
    }
}

/// Ownership table of outstanding expiry timers, keyed by notification id.
#[derive(Debug, Default)]
pub struct TimerTable {
    by_id: HashMap<NotificationId, TimerHandle>,
    by_deadline: BTreeMap<(Duration, u64), NotificationId>,
    next_seq: u64,
}

impl TimerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules an expiry for `id`, replacing any timer it already had.
    pub fn schedule(&mut self, id: NotificationId, deadline: Duration) -> TimerHandle {
        self.cancel(id);

        let handle = TimerHandle {
            deadline,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        self.by_id.insert(id, handle);
        self.by_deadline.insert(handle.key(), id);
        handle
    }

    /// Cancels the timer for `id`. A cancelled timer can never be returned by `pop_due`.
    pub fn cancel(&mut self, id: NotificationId) -> Option<TimerHandle> {
        let handle = self.by_id.remove(&id)?;
        self.by_deadline.remove(&handle.key());
        Some(handle)
    }

    /// Removes and returns the earliest timer due at `now`, if any.
    pub fn pop_due(&mut self, now: Duration) -> Option<NotificationId> {
        let entry = self.by_deadline.first_entry()?;
        if entry.key().0 > now {
            return None;
        }
        let id = entry.remove();
        self.by_id.remove(&id);
        Some(id)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.by_deadline.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn get(&self, id: NotificationId) -> Option<TimerHandle> {
        self.by_id.get(&id).copied()
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Cancels every timer; returns how many were outstanding.
    pub fn clear(&mut self) -> usize {
        let cancelled = self.by_id.len();
        self.by_id.clear();
        self.by_deadline.clear();
        cancelled
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod timer_tests;
