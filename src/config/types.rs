// Configuration type definitions

use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ToastError;

pub const DEFAULT_CAPACITY: usize = 4;
pub const DEFAULT_LIFETIME_MS: u64 = 4000;

/// Screen corner the toast stack is anchored to. Only a rendering hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::TopLeft,
        Position::TopRight,
        Position::BottomLeft,
        Position::BottomRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Position::TopLeft => "top-left",
            Position::TopRight => "top-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomRight => "bottom-right",
        }
    }

    /// Parses a position name, falling back to `TopRight` for anything unknown.
    pub fn parse_lenient(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(value.trim()))
            .unwrap_or_default()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Unknown positions must not fail the whole config file
impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let position = Position::parse_lenient(&raw);
        if position.as_str() != raw.trim().to_ascii_lowercase() {
            log::warn!("Unknown toast position {:?}, using {}", raw, position);
        }
        Ok(position)
    }
}

/// Queue configuration section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_lifetime_ms")]
    pub default_lifetime_ms: u64,
    #[serde(default)]
    pub position: Position,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_lifetime_ms() -> u64 {
    DEFAULT_LIFETIME_MS
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            capacity: DEFAULT_CAPACITY,
            default_lifetime_ms: DEFAULT_LIFETIME_MS,
            position: Position::TopRight,
        }
    }
}

impl QueueConfig {
    /// Validates the raw values into settings a queue can be built from.
    pub fn settings(&self) -> Result<QueueSettings, ToastError> {
        QueueSettings::new(
            self.capacity,
            Duration::from_millis(self.default_lifetime_ms),
        )
        .map(|settings| settings.with_position(self.position))
    }
}

/// Validated queue construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    pub capacity: NonZeroUsize,
    pub default_lifetime: Duration,
    pub position: Position,
}

impl QueueSettings {
    /// Rejects a zero capacity or a zero default lifetime.
    pub fn new(capacity: usize, default_lifetime: Duration) -> Result<Self, ToastError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(ToastError::InvalidCapacity)?;
        if default_lifetime.is_zero() {
            return Err(ToastError::InvalidLifetime);
        }
        Ok(Self {
            capacity,
            default_lifetime,
            position: Position::default(),
        })
    }

    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            default_lifetime: Duration::from_millis(DEFAULT_LIFETIME_MS),
            position: Position::TopRight,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
