//! Notification records
//!
//! Provides the value types stored in the queue and the request type producers
//! use to create them.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use super::id::NotificationId;

/// Notification category - a fixed set, unknown input becomes `Info`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Info,
        Category::Success,
        Category::Warning,
        Category::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Info => "info",
            Category::Success => "success",
            Category::Warning => "warning",
            Category::Error => "error",
        }
    }

    /// Parse a category name, normalizing anything unrecognized to `Info`
    pub fn parse_lenient(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value.trim()))
            .unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single queued notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub description: String,
    pub category: Category,
    /// Resolved lifetime: the per-notification override or the queue default
    #[serde(rename = "lifetime_ms", serialize_with = "serialize_millis")]
    pub lifetime: Duration,
}

fn serialize_millis<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

/// Request passed to `NotificationQueue::add`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNotification {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub lifetime: Option<Duration>,
}

impl NewNotification {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the category from free-form input; unknown names become `Info`
    #[must_use]
    pub fn category_str(mut self, category: &str) -> Self {
        self.category = Some(Category::parse_lenient(category));
        self
    }

    #[must_use]
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Build the stored record. A zero lifetime override falls back to the default.
    pub(crate) fn into_notification(
        self,
        id: NotificationId,
        default_lifetime: Duration,
    ) -> Notification {
        let lifetime = self
            .lifetime
            .filter(|lifetime| !lifetime.is_zero())
            .unwrap_or(default_lifetime);

        Notification {
            id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            lifetime,
        }
    }
}

impl From<&str> for NewNotification {
    fn from(title: &str) -> Self {
        Self::new(title)
    }
}

impl From<String> for NewNotification {
    fn from(title: String) -> Self {
        Self::new(title)
    }
}

#[cfg(test)]
#[path = "notification_state_tests.rs"]
mod notification_state_tests;
