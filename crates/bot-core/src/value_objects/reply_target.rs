//! Reply target value object
//!
//! Describes where a reply to a dispatched event should be sent and which id
//! ties the reply back to the triggering event.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation id attached to a passive reply
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Correlation {
    /// Reply to a message, sent as `msg_id`
    MsgId(String),
    /// Reply to a non-message event, sent as `event_id`
    EventId(String),
}

impl Correlation {
    /// Name of the request body field carrying this id
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::MsgId(_) => "msg_id",
            Self::EventId(_) => "event_id",
        }
    }

    /// The raw id value
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::MsgId(id) | Self::EventId(id) => id,
        }
    }
}

/// Destination of a reply
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyTarget {
    /// Guild text channel
    Channel {
        channel_id: String,
        correlation: Correlation,
    },
    /// Direct message session, addressed by its guild id
    DirectMessage {
        guild_id: String,
        correlation: Correlation,
    },
    /// Group chat
    Group {
        group_openid: String,
        correlation: Correlation,
    },
    /// Single user (C2C) chat
    User {
        user_openid: String,
        correlation: Correlation,
    },
}

impl ReplyTarget {
    /// Id of the destination (channel, guild, group or user)
    #[must_use]
    pub fn destination_id(&self) -> &str {
        match self {
            Self::Channel { channel_id, .. } => channel_id,
            Self::DirectMessage { guild_id, .. } => guild_id,
            Self::Group { group_openid, .. } => group_openid,
            Self::User { user_openid, .. } => user_openid,
        }
    }

    #[must_use]
    pub fn correlation(&self) -> &Correlation {
        match self {
            Self::Channel { correlation, .. }
            | Self::DirectMessage { correlation, .. }
            | Self::Group { correlation, .. }
            | Self::User { correlation, .. } => correlation,
        }
    }

    /// Short kind label used in logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Channel { .. } => "channel",
            Self::DirectMessage { .. } => "direct_message",
            Self::Group { .. } => "group",
            Self::User { .. } => "user",
        }
    }
}

impl fmt::Display for ReplyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} ({}={})",
            self.kind(),
            self.destination_id(),
            self.correlation().field_name(),
            self.correlation().id()
        )
    }
}
