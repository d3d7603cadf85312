//! Notification module for toastq
//!
//! Provides a bounded toast queue with per-item expiry timers. Any component in
//! the application can push notifications through a queue handle it was given.

mod host;
mod id;
mod notification_state;
mod queue;
mod subscribers;
mod timer;

pub use host::{TokioClock, ToastHandle, ToastHost};
pub use id::{IdGenerator, NotificationId};
pub use notification_state::{Category, NewNotification, Notification};
pub use queue::NotificationQueue;
pub use subscribers::{Listener, SubscriptionId, Subscribers};
pub use timer::{Clock, ManualClock, SystemClock, TimerHandle, TimerTable};
