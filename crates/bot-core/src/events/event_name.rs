//! Router event names
//!
//! Dotted, lower-case names that subscribers register for. A dispatch with type
//! `GROUP_AT_MESSAGE_CREATE` is published under `group.at.message.create` and each of its
//! prefixes. Names outside the known set are carried by [`EventName::Other`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

macro_rules! event_names {
    ($( $(#[$doc:meta])* $variant:ident => $name:literal, )*) => {
        /// Subscribable event name
        ///
        /// Equality and hashing go through [`EventName::as_str`], so `Other("guild")` and
        /// `Guild` address the same subscribers.
        #[derive(Debug, Clone)]
        pub enum EventName {
            $( $(#[$doc])* $variant, )*
            /// Any name not listed above
            Other(String),
        }

        impl EventName {
            /// Every known name, in declaration order
            pub const KNOWN: &'static [EventName] = &[$( EventName::$variant, )*];

            /// Get the dotted string form
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $name, )*
                    Self::Other(name) => name,
                }
            }

            /// Parse a dotted name, falling back to [`EventName::Other`]
            #[must_use]
            pub fn parse(name: &str) -> Self {
                match name {
                    $( $name => Self::$variant, )*
                    other => Self::Other(other.to_string()),
                }
            }
        }
    };
}

event_names! {
    // Session lifecycle
    /// Every session lifecycle event
    Session => "session",
    /// Fresh authentication completed
    SessionReady => "session.ready",
    /// Resume completed
    SessionResumed => "session.resumed",
    /// The engine stopped for good (reconnects exhausted or fatal close)
    SessionDead => "session.dead",

    // Guilds
    Guild => "guild",
    GuildCreate => "guild.create",
    GuildUpdate => "guild.update",
    GuildDelete => "guild.delete",
    GuildMember => "guild.member",
    GuildMemberAdd => "guild.member.add",
    GuildMemberUpdate => "guild.member.update",
    GuildMemberRemove => "guild.member.remove",

    // Channels
    Channel => "channel",
    ChannelCreate => "channel.create",
    ChannelUpdate => "channel.update",
    ChannelDelete => "channel.delete",

    // Guild messages
    Message => "message",
    MessageCreate => "message.create",
    MessageDelete => "message.delete",
    MessageReaction => "message.reaction",
    MessageReactionAdd => "message.reaction.add",
    MessageReactionRemove => "message.reaction.remove",
    MessageAudit => "message.audit",
    MessageAuditPass => "message.audit.pass",
    MessageAuditReject => "message.audit.reject",

    // @-mention messages
    At => "at",
    AtMessage => "at.message",
    AtMessageCreate => "at.message.create",

    // Direct messages
    Direct => "direct",
    DirectMessage => "direct.message",
    DirectMessageCreate => "direct.message.create",
    DirectMessageDelete => "direct.message.delete",

    // Groups and single chats
    Group => "group",
    GroupAt => "group.at",
    GroupAtMessage => "group.at.message",
    GroupAtMessageCreate => "group.at.message.create",
    C2c => "c2c",
    C2cMessage => "c2c.message",
    C2cMessageCreate => "c2c.message.create",

    // Forums
    Forum => "forum",
    ForumThread => "forum.thread",
    ForumThreadCreate => "forum.thread.create",
    ForumThreadUpdate => "forum.thread.update",
    ForumThreadDelete => "forum.thread.delete",
    ForumPost => "forum.post",
    ForumPostCreate => "forum.post.create",
    ForumPostDelete => "forum.post.delete",
    ForumReply => "forum.reply",
    ForumReplyCreate => "forum.reply.create",
    ForumReplyDelete => "forum.reply.delete",

    // Interactions
    Interaction => "interaction",
    InteractionCreate => "interaction.create",

    // Audio
    Audio => "audio",
    AudioStart => "audio.start",
    AudioFinish => "audio.finish",
    AudioOnMic => "audio.on.mic",
    AudioOffMic => "audio.off.mic",
}

impl EventName {
    /// Check whether this name belongs to the synthetic `session.` namespace
    #[must_use]
    pub fn is_session(&self) -> bool {
        let name = self.as_str();
        name == "session" || name.starts_with("session.")
    }
}

impl PartialEq for EventName {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for EventName {}

impl Hash for EventName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl Serialize for EventName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}
