//! toastq library - bounded toast-notification queue
//!
//! This library exposes the queue, its real-time host, configuration and the
//! script replay used by the `toastq` binary.

pub mod config;
pub mod error;
pub mod notification;
pub mod script;

// Re-export commonly used types for convenience
pub use config::{Config, Position, QueueSettings};
pub use error::ToastError;
pub use notification::{
    Category, NewNotification, Notification, NotificationId, NotificationQueue, ToastHandle,
    ToastHost,
};
