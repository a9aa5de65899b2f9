//! Gateway intent bitflags
//!
//! Intents select which event categories the gateway pushes to a session. Bit positions are
//! fixed by the remote protocol.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Gateway intent flags
    ///
    /// Sent as a plain integer in the Identify payload.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intents: u32 {
        /// Guild create/update/delete, channel create/update/delete
        const GUILDS                       = 1 << 0;
        /// Guild member add/update/remove
        const GUILD_MEMBERS                = 1 << 1;
        /// All guild messages (private bots only)
        const GUILD_MESSAGES               = 1 << 9;
        /// Message reaction add/remove
        const GUILD_MESSAGE_REACTIONS      = 1 << 10;
        /// Direct messages
        const DIRECT_MESSAGE               = 1 << 12;
        /// Forum events visible to public bots
        const OPEN_FORUMS_EVENT            = 1 << 18;
        /// Audio and live channel member enter/exit
        const AUDIO_OR_LIVE_CHANNEL_MEMBER = 1 << 19;
        /// Group @-messages and single-chat (C2C) messages
        const GROUP_AND_C2C_EVENT          = 1 << 25;
        /// Interaction (button callback) events
        const INTERACTION                  = 1 << 26;
        /// Message audit pass/reject
        const MESSAGE_AUDIT                = 1 << 27;
        /// Forum events (private bots only)
        const FORUMS_EVENT                 = 1 << 28;
        /// Audio playback events
        const AUDIO_ACTION                 = 1 << 29;
        /// Messages that @-mention the bot in guilds
        const PUBLIC_GUILD_MESSAGES        = 1 << 30;
    }
}

/// Older names still accepted in configuration
const ALIASES: &[(&str, Intents)] = &[("GROUP_MESSAGES", Intents::GROUP_AND_C2C_EVENT)];

/// Error returned when an intent name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown intent: {0}")]
pub struct IntentParseError(pub String);

impl Intents {
    /// Look up a single intent by its protocol name (case-insensitive)
    pub fn lookup(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_uppercase();
        Self::from_name(&normalized).or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == normalized)
                .map(|(_, intent)| *intent)
        })
    }

    /// Combine a list of intent names into a mask
    pub fn parse_names<'a, I>(names: I) -> Result<Self, IntentParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter(|name| !name.trim().is_empty())
            .try_fold(Intents::empty(), |acc, name| {
                Self::lookup(name)
                    .map(|intent| acc | intent)
                    .ok_or_else(|| IntentParseError(name.trim().to_string()))
            })
    }

    /// Get the protocol names of all set intents
    pub fn names(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Default for Intents {
    fn default() -> Self {
        Intents::empty()
    }
}

impl fmt::Display for Intents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Intents::from_bits_truncate(bits))
    }
}

impl From<Intents> for u32 {
    fn from(intents: Intents) -> Self {
        intents.bits()
    }
}
