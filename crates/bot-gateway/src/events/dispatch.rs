//! Dispatch values passed through interceptors and to subscribers

use bot_core::{EventName, ReplyTarget};
use serde_json::{Map, Value};
use std::sync::Arc;

/// An inbound dispatch on its way to the router
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    /// Raw type, e.g. `AT_MESSAGE_CREATE`
    pub event_type: String,
    pub sequence: Option<u64>,
    pub data: Value,
    /// Where a reply to this event should go, if anywhere
    pub reply: Option<ReplyTarget>,
}

impl Dispatch {
    #[must_use]
    pub fn new(event_type: impl Into<String>, sequence: Option<u64>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            sequence,
            data,
            reply: None,
        }
    }

    #[must_use]
    pub fn with_reply(mut self, reply: ReplyTarget) -> Self {
        self.reply = Some(reply);
        self
    }

    /// Payload handed to subscribers: `{ "t": event_type, ..data }`
    ///
    /// A `t` already present in `data` is kept. Non-object data is wrapped as `{ "t", "d" }`.
    #[must_use]
    pub fn merged_payload(&self) -> Value {
        let mut merged = Map::new();
        merged.insert("t".to_string(), Value::String(self.event_type.clone()));

        match &self.data {
            Value::Object(fields) => {
                merged.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            other => {
                merged.insert("d".to_string(), other.clone());
            }
        }

        Value::Object(merged)
    }
}

/// Dispatch contents shared by every emission of one event
#[derive(Debug)]
pub struct RoutedDispatch {
    pub event_type: String,
    pub sequence: Option<u64>,
    pub payload: Value,
    pub reply: Option<ReplyTarget>,
}

impl From<Dispatch> for RoutedDispatch {
    fn from(dispatch: Dispatch) -> Self {
        Self {
            payload: dispatch.merged_payload(),
            event_type: dispatch.event_type,
            sequence: dispatch.sequence,
            reply: dispatch.reply,
        }
    }
}

/// What a subscriber receives
#[derive(Debug, Clone)]
pub struct DispatchEvent {
    name: EventName,
    dispatch: Arc<RoutedDispatch>,
}

impl DispatchEvent {
    #[must_use]
    pub fn new(name: EventName, dispatch: Arc<RoutedDispatch>) -> Self {
        Self { name, dispatch }
    }

    /// Name this emission was published under
    #[must_use]
    pub fn name(&self) -> &EventName {
        &self.name
    }

    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.dispatch.event_type
    }

    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.dispatch.sequence
    }

    /// Payload merged with the `t` tag
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.dispatch.payload
    }

    #[must_use]
    pub fn reply_target(&self) -> Option<&ReplyTarget> {
        self.dispatch.reply.as_ref()
    }
}
