//! Real-time host for a notification queue
//!
//! Owns a [`NotificationQueue`] behind a single mutex and runs a background
//! tokio task that sleeps until the next expiry deadline and delivers due
//! timers. Every mutation (add, remove, timer fire, dispose) goes through the
//! same mutex, so they never interleave.
//!
//! Producers get a cloneable [`ToastHandle`]; the [`ToastHost`] itself owns the
//! lifecycle and disposes the queue when dropped.

use std::future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use super::id::NotificationId;
use super::notification_state::{NewNotification, Notification};
use super::queue::NotificationQueue;
use super::subscribers::SubscriptionId;
use super::timer::Clock;
use crate::config::QueueSettings;

/// Clock on tokio's time source, so paused-time tests drive expiry too
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    epoch: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Convert a queue deadline back into an instant to sleep until.
    /// `None` when the deadline lies beyond what `Instant` can represent.
    pub fn instant_at(&self, offset: Duration) -> Option<Instant> {
        self.epoch.checked_add(offset)
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

struct Shared {
    queue: Mutex<NotificationQueue<TokioClock>>,
    clock: TokioClock,
    wake: Notify,
    cancel: CancellationToken,
    snapshots: watch::Receiver<Vec<Notification>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, NotificationQueue<TokioClock>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable producer-side handle to a hosted queue
#[derive(Clone)]
pub struct ToastHandle {
    shared: Arc<Shared>,
}

impl ToastHandle {
    pub fn add(&self, request: impl Into<NewNotification>) -> NotificationId {
        let id = self.shared.lock().add(request);
        self.shared.wake.notify_one();
        id
    }

    pub fn remove(&self, id: NotificationId) -> bool {
        let removed = self.shared.lock().remove(id);
        if removed {
            self.shared.wake.notify_one();
        }
        removed
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.shared.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    pub fn clock(&self) -> TokioClock {
        self.shared.clock
    }

    /// Listener runs while the queue lock is held; it must not call back into the handle.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&[Notification]) + Send + 'static,
    {
        self.shared.lock().subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.lock().unsubscribe(id)
    }

    /// Receiver that reports snapshots published after this call
    pub fn watch(&self) -> watch::Receiver<Vec<Notification>> {
        let mut rx = self.shared.snapshots.clone();
        rx.borrow_and_update();
        rx
    }

    /// Resolves once the queue is empty or disposed
    pub async fn drained(&self) {
        let mut rx = self.watch();
        while !self.is_disposed() && !self.is_empty() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Owner of a hosted queue and its timer task
pub struct ToastHost {
    handle: ToastHandle,
    task: Option<JoinHandle<()>>,
}

impl ToastHost {
    /// Start hosting a queue. Must be called from within a tokio runtime.
    pub fn spawn(settings: QueueSettings) -> Self {
        let clock = TokioClock::new();
        let mut queue = NotificationQueue::new(settings, clock);

        let (tx, rx) = watch::channel(Vec::new());
        queue.subscribe(move |snapshot| {
            tx.send_replace(snapshot.to_vec());
        });

        let shared = Arc::new(Shared {
            queue: Mutex::new(queue),
            clock,
            wake: Notify::new(),
            cancel: CancellationToken::new(),
            snapshots: rx,
        });

        let task = tokio::spawn(run_timers(Arc::clone(&shared)));
        log::debug!(
            "Toast host started (capacity {}, lifetime {:?})",
            settings.capacity,
            settings.default_lifetime
        );

        Self {
            handle: ToastHandle { shared },
            task: Some(task),
        }
    }

    pub fn handle(&self) -> ToastHandle {
        self.handle.clone()
    }

    /// Stop the timer task and dispose the queue. Idempotent.
    pub fn dispose(&mut self) {
        if self.handle.shared.cancel.is_cancelled() {
            return;
        }
        self.handle.shared.cancel.cancel();
        self.handle.shared.lock().dispose();
        log::debug!("Toast host disposed");
    }

    /// Dispose and wait for the timer task to finish
    pub async fn shutdown(mut self) {
        self.dispose();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            log::error!("Toast timer task failed: {}", e);
        }
    }
}

impl std::ops::Deref for ToastHost {
    type Target = ToastHandle;

    fn deref(&self) -> &ToastHandle {
        &self.handle
    }
}

impl Drop for ToastHost {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_timers(shared: Arc<Shared>) {
    loop {
        let next = {
            let mut queue = shared.lock();
            queue.tick();
            queue.next_deadline()
        };

        let sleep = async {
            // Unrepresentable deadlines never come due; a later add wakes the task
            match next.and_then(|deadline| shared.clock.instant_at(deadline)) {
                Some(at) => sleep_until(at).await,
                None => future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = shared.cancel.cancelled() => break,
            _ = shared.wake.notified() => {}
            _ = sleep => {}
        }
    }
    log::debug!("Toast timer task stopped");
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod host_tests;
