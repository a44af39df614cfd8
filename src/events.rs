//! Watcher events, printed by the headless console loop in `main`.

use chrono::{DateTime, Local};
use std::fmt::Display;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventType {
    /// Progress update, task still in flight.
    Status,
    /// Terminal success.
    Success,
    /// Terminal failure.
    Error,
}

#[derive(Clone, Debug)]
pub struct Event {
    pub event_type: EventType,
    pub msg: String,
    pub timestamp: DateTime<Local>,
}

impl Event {
    fn new(event_type: EventType, msg: String) -> Self {
        Self {
            event_type,
            msg,
            timestamp: Local::now(),
        }
    }

    pub fn status(msg: impl Into<String>) -> Self {
        Self::new(EventType::Status, msg.into())
    }

    pub fn success(msg: impl Into<String>) -> Self {
        Self::new(EventType::Success, msg.into())
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::new(EventType::Error, msg.into())
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.msg)
    }
}
