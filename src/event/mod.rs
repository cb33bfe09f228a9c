//! Event model
//!
//! Events are built by the gateway once per occurrence, handed to every
//! interested hook and then dropped.

mod context;
mod kind;

pub use context::{EventContext, PositionSnapshot};
pub use kind::EventKind;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single event occurrence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event family
    #[serde(rename = "type", alias = "name")]
    pub kind: EventKind,
    /// Sub-action within the family (`new`, `reset`, ...)
    #[serde(default, alias = "topic", skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Gateway session key (`agent:main:telegram:1234`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    /// When the event occurred
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Event payload
    #[serde(default)]
    pub context: EventContext,
    /// Outbound notifications for the user
    #[serde(default)]
    pub messages: Vec<String>,
}

impl Event {
    /// Create an event of the given kind stamped with the current time
    pub fn new(kind: impl Into<EventKind>) -> Self {
        Self {
            kind: kind.into(),
            action: None,
            session_key: None,
            timestamp: Utc::now(),
            context: EventContext::default(),
            messages: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_session_key(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = Some(session_key.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_context(mut self, context: EventContext) -> Self {
        self.context = context;
        self
    }

    /// Whether the event carries the given action
    pub fn is_action(&self, action: &str) -> bool {
        self.action.as_deref() == Some(action)
    }

    /// Queue a message for delivery to the user
    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}
