//! Event system for UI updates
//!
//! The session publishes a snapshot after every committed transition, plus
//! address changes and one-shot notifications. Built on
//! `tokio::sync::broadcast`, so any number of renderers can subscribe and a
//! slow one never blocks the session.
//!
//! # Example
//!
//! ```no_run
//! use libbankcode::events::{EventBus, Notice, SessionEvent};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(64);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(SessionEvent::Notification(Notice::info("Copied 0040001")));
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::Serialize;
use tokio::sync::broadcast;

use crate::selection::Snapshot;

pub type EventReceiver = broadcast::Receiver<SessionEvent>;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// `capacity` is the per-subscriber buffer; lagging subscribers lose the oldest events
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Non-blocking. Dropped silently when nobody is subscribed.
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// State after a committed transition
    Committed { snapshot: Box<Snapshot> },

    /// The address was pushed to a new location
    AddressChanged { path: String },

    /// One-shot message for the user, e.g. a refused clipboard write
    Notification(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
