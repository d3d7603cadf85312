//! Command-script replay
//!
//! Stands in for a presentation layer: it drives a queue from a JSON-lines
//! script and writes every snapshot the queue publishes as one JSON line.
//!
//! ```text
//! {"op":"add","title":"Saved","category":"success","lifetime_ms":2000}
//! {"op":"wait","ms":500}
//! {"op":"remove","id":1}
//! {"op":"dispose"}
//! ```

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::QueueSettings;
use crate::error::ToastError;
use crate::notification::{
    Clock, Listener, ManualClock, NewNotification, Notification, NotificationId,
    NotificationQueue, ToastHost,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ScriptCommand {
    Add(AddCommand),
    Remove { id: u64 },
    Wait { ms: u64 },
    Dispose,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddCommand {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub lifetime_ms: Option<u64>,
}

impl AddCommand {
    pub fn to_request(&self) -> NewNotification {
        let mut request = NewNotification::new(self.title.as_str());
        if let Some(description) = &self.description {
            request = request.description(description.as_str());
        }
        if let Some(category) = &self.category {
            request = request.category_str(category);
        }
        if let Some(lifetime_ms) = self.lifetime_ms {
            request = request.lifetime(Duration::from_millis(lifetime_ms));
        }
        request
    }
}

/// One published snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub at_ms: u64,
    pub toasts: Vec<Notification>,
}

type FrameLog = Arc<Mutex<Vec<Frame>>>;

/// Parse a JSON-lines script. Blank lines and `#` comments are skipped.
pub fn parse_script(source: &str) -> Result<Vec<ScriptCommand>, ToastError> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, text)| {
            serde_json::from_str(text).map_err(|e| ToastError::Script {
                line,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Replay against a simulated clock. `wait` jumps straight to each expiry
/// deadline, so the run is instant and deterministic.
///
/// Returns the number of frames written.
pub fn replay_simulated<W: Write>(
    commands: &[ScriptCommand],
    settings: QueueSettings,
    out: &mut W,
) -> Result<usize, ToastError> {
    let clock = ManualClock::new();
    let mut queue = NotificationQueue::new(settings, clock.clone());
    let (frames, listener) = record_frames(clock.clone());
    queue.subscribe(listener);

    let mut written = 0;
    for command in commands {
        match command {
            ScriptCommand::Add(add) => {
                queue.add(add.to_request());
            }
            ScriptCommand::Remove { id } => {
                queue.remove(NotificationId::from_raw(*id));
            }
            ScriptCommand::Wait { ms } => {
                let target = clock.now().saturating_add(Duration::from_millis(*ms));
                advance_until(&mut queue, &clock, Some(target));
            }
            ScriptCommand::Dispose => queue.dispose(),
        }
        written += flush_frames(&frames, out)?;
    }

    advance_until(&mut queue, &clock, None);
    written += flush_frames(&frames, out)?;
    Ok(written)
}

/// Replay in real time through a [`ToastHost`]. Must run inside a tokio runtime.
///
/// Returns the number of frames written.
pub async fn replay_realtime<W: Write>(
    commands: &[ScriptCommand],
    settings: QueueSettings,
    out: &mut W,
) -> Result<usize, ToastError> {
    let mut host = ToastHost::spawn(settings);
    let handle = host.handle();
    let (frames, listener) = record_frames(handle.clock());
    handle.subscribe(listener);

    let mut written = 0;
    for command in commands {
        match command {
            ScriptCommand::Add(add) => {
                handle.add(add.to_request());
            }
            ScriptCommand::Remove { id } => {
                handle.remove(NotificationId::from_raw(*id));
            }
            ScriptCommand::Wait { ms } => tokio::time::sleep(Duration::from_millis(*ms)).await,
            ScriptCommand::Dispose => host.dispose(),
        }
        written += flush_frames(&frames, out)?;
    }

    handle.drained().await;
    written += flush_frames(&frames, out)?;
    host.shutdown().await;
    Ok(written)
}

/// Step the simulated clock from deadline to deadline, firing timers on the way.
/// `None` runs until no timers remain that the clock can reach.
fn advance_until(
    queue: &mut NotificationQueue<ManualClock>,
    clock: &ManualClock,
    target: Option<Duration>,
) {
    while let Some(deadline) = queue.next_deadline() {
        if target.is_some_and(|target| deadline > target) {
            break;
        }
        if deadline > clock.now() {
            clock.set(deadline);
        }
        // The clock saturates, so deadlines past its range never come due
        if queue.tick() == 0 {
            break;
        }
    }
    if let Some(target) = target {
        clock.set(target);
    }
}

fn record_frames<C>(clock: C) -> (FrameLog, Listener)
where
    C: Clock + Send + 'static,
{
    let frames: FrameLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&frames);
    let listener: Listener = Box::new(move |snapshot: &[Notification]| {
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Frame {
                at_ms: u64::try_from(clock.now().as_millis()).unwrap_or(u64::MAX),
                toasts: snapshot.to_vec(),
            });
    });
    (frames, listener)
}

fn flush_frames<W: Write>(frames: &FrameLog, out: &mut W) -> Result<usize, ToastError> {
    let pending = std::mem::take(&mut *frames.lock().unwrap_or_else(PoisonError::into_inner));
    for frame in &pending {
        serde_json::to_writer(&mut *out, frame)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(pending.len())
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod script_tests;
