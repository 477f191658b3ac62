//! Progress notifications.

use std::fmt;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use serde::Serialize;

/// A snapshot of progress through a long-running operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressNotification {
    pub message: String,
    pub current: u64,
    pub min: u64,
    pub max: u64,
    /// Set on the final notification of an operation that was cut short.
    pub aborted: bool,
}

impl ProgressNotification {
    pub fn new<S: Into<String>>(message: S, current: u64, max: u64) -> Self {
        ProgressNotification {
            message: message.into(),
            current,
            min: 0,
            max,
            aborted: false,
        }
    }

    pub fn aborted(mut self) -> Self {
        self.aborted = true;
        self
    }
}

/// Receives progress notifications. Delivery is synchronous and the sink
/// cannot push back.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, notification: &ProgressNotification);
}

impl fmt::Debug for dyn ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressSink")
    }
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressNotification) + Send + Sync,
{
    fn notify(&self, notification: &ProgressNotification) {
        self(notification)
    }
}

impl ProgressSink for Sender<ProgressNotification> {
    fn notify(&self, notification: &ProgressNotification) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.send(notification.clone());
    }
}

/// Sink that keeps every notification it receives.
#[derive(Debug, Default)]
pub struct ProgressLog {
    events: Mutex<Vec<ProgressNotification>>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressNotification> {
        self.events.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.message.clone()).collect()
    }

    pub fn last(&self) -> Option<ProgressNotification> {
        self.events.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl ProgressSink for ProgressLog {
    fn notify(&self, notification: &ProgressNotification) {
        self.events.lock().push(notification.clone());
    }
}
