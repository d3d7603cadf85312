//! Bounded, self-expiring notification queue
//!
//! Items are kept in insertion order (oldest first). Adding past capacity
//! evicts from the front. Every queued item owns exactly one expiry timer in
//! the [`TimerTable`]; removing an item by any path cancels its timer in the
//! same step, so a timer never fires for an item that is already gone.
//!
//! The queue never sleeps or spawns anything. Time only moves through its
//! [`Clock`], and due timers are delivered by calling [`NotificationQueue::tick`].

use std::collections::VecDeque;
use std::time::Duration;

use super::id::{IdGenerator, NotificationId};
use super::notification_state::{NewNotification, Notification};
use super::subscribers::{Subscribers, SubscriptionId};
use super::timer::{Clock, SystemClock, TimerTable};
use crate::config::{Position, QueueSettings};

#[derive(Debug)]
pub struct NotificationQueue<C: Clock = SystemClock> {
    items: VecDeque<Notification>,
    timers: TimerTable,
    ids: IdGenerator,
    subscribers: Subscribers,
    settings: QueueSettings,
    clock: C,
    disposed: bool,
}

impl NotificationQueue<SystemClock> {
    pub fn with_system_clock(settings: QueueSettings) -> Self {
        Self::new(settings, SystemClock::new())
    }
}

impl<C: Clock> NotificationQueue<C> {
    pub fn new(settings: QueueSettings, clock: C) -> Self {
        Self {
            items: VecDeque::with_capacity(settings.capacity.get()),
            timers: TimerTable::new(),
            ids: IdGenerator::new(),
            subscribers: Subscribers::new(),
            settings,
            clock,
            disposed: false,
        }
    }

    /// Queue a notification and schedule its expiry.
    ///
    /// If the queue is full the oldest items are dropped silently. After
    /// `dispose` nothing is queued, but an id is still returned.
    pub fn add(&mut self, request: impl Into<NewNotification>) -> NotificationId {
        let id = self.ids.next_id();
        if self.disposed {
            log::warn!("add({}) called on a disposed notification queue", id);
            return id;
        }

        let notification = request
            .into()
            .into_notification(id, self.settings.default_lifetime);
        let deadline = self.clock.now().saturating_add(notification.lifetime);

        log::debug!(
            "Queued {} [{}] {:?}, expires at {:?}",
            id,
            notification.category,
            notification.title,
            deadline
        );

        self.items.push_back(notification);
        self.timers.schedule(id, deadline);
        self.evict_overflow();

        self.check_invariants();
        self.publish();
        id
    }

    /// Remove a notification early. Unknown ids are ignored.
    ///
    /// Returns true if something was removed.
    pub fn remove(&mut self, id: NotificationId) -> bool {
        if self.disposed {
            log::warn!("remove({}) called on a disposed notification queue", id);
            return false;
        }

        if !self.take(id) {
            return false;
        }
        log::debug!("Removed {}", id);

        self.check_invariants();
        self.publish();
        true
    }

    /// Fire every timer that is due, oldest deadline first.
    ///
    /// Returns how many notifications expired.
    pub fn tick(&mut self) -> usize {
        if self.disposed {
            return 0;
        }

        let now = self.clock.now();
        let mut expired = 0;
        while let Some(id) = self.timers.pop_due(now) {
            if let Some(index) = self.index_of(id) {
                self.items.remove(index);
                expired += 1;
                log::debug!("Expired {} at {:?}", id, now);
            }
        }

        if expired > 0 {
            self.check_invariants();
            self.publish();
        }
        expired
    }

    /// Cancel all timers and drop all items and subscribers.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        let cancelled = self.timers.clear();
        self.items.clear();
        log::debug!("Disposed notification queue, cancelled {} timers", cancelled);

        self.publish();
        self.subscribers.clear();
        self.disposed = true;
    }

    /// Register a listener for queue changes.
    ///
    /// The listener receives the ordered snapshot after every change; it is not
    /// called with the current state on registration.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&[Notification]) + Send + 'static,
    {
        self.subscribers.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.items.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Earliest pending expiry, measured on the queue's clock
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn deadline_of(&self, id: NotificationId) -> Option<Duration> {
        self.timers.get(id).map(|handle| handle.deadline)
    }

    pub fn capacity(&self) -> usize {
        self.settings.capacity.get()
    }

    pub fn default_lifetime(&self) -> Duration {
        self.settings.default_lifetime
    }

    pub fn position(&self) -> Position {
        self.settings.position
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn evict_overflow(&mut self) {
        while self.items.len() > self.settings.capacity.get() {
            let Some(oldest) = self.items.front().map(|n| n.id) else {
                break;
            };
            self.take(oldest);
            log::debug!("Evicted {} (capacity {})", oldest, self.settings.capacity);
        }
    }

    /// Cancel the timer, then drop the item
    fn take(&mut self, id: NotificationId) -> bool {
        self.timers.cancel(id);
        match self.index_of(id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    fn index_of(&self, id: NotificationId) -> Option<usize> {
        self.items.iter().position(|n| n.id == id)
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.items.make_contiguous();
        self.subscribers.notify(snapshot);
    }

    fn check_invariants(&self) {
        debug_assert!(self.items.len() <= self.settings.capacity.get());
        debug_assert_eq!(self.items.len(), self.timers.len());
        debug_assert!(self.items.iter().all(|n| self.timers.contains(n.id)));
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod queue_tests;
