//! WebSocket close codes
//!
//! Gateway-specific close codes and how the session reacts to each of them.

use serde::{Deserialize, Serialize};

/// What the session does after the gateway closes the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDisposition {
    /// Reconnect and resume if a session identity is known
    Resume,
    /// Reconnect with a fresh Identify; the old session is gone
    Fresh,
    /// Renew the credential and identify again; fatal if it happens twice in a row
    Reauthenticate,
    /// Retrying cannot succeed; stop the session
    Fatal,
}

/// Gateway WebSocket close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Invalid opcode sent
    UnknownOpcode = 4001,
    /// Invalid payload
    DecodeError = 4002,
    /// Authentication failed (bad or expired token)
    AuthenticationFailed = 4004,
    /// Session id is invalid and cannot be resumed
    InvalidSession = 4006,
    /// Sequence number is invalid for Resume
    InvalidSequence = 4007,
    /// Payloads sent too fast
    RateLimited = 4008,
    /// Session has timed out
    SessionTimeout = 4009,
    /// Invalid shard
    InvalidShard = 4010,
    /// Too many guilds for one connection, sharding required
    ShardingRequired = 4011,
    /// Invalid gateway version
    InvalidApiVersion = 4012,
    /// Invalid intent
    InvalidIntent = 4013,
    /// Intent is not permitted for this bot
    DisallowedIntent = 4014,
    /// Bot is offline (sandbox-only)
    BotOffline = 4914,
    /// Bot is banned
    BotBanned = 4915,
}

/// Server-side internal errors occupy this range; reconnecting is the remedy
pub const INTERNAL_ERROR_RANGE: std::ops::RangeInclusive<u16> = 4900..=4913;

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4001 => Some(Self::UnknownOpcode),
            4002 => Some(Self::DecodeError),
            4004 => Some(Self::AuthenticationFailed),
            4006 => Some(Self::InvalidSession),
            4007 => Some(Self::InvalidSequence),
            4008 => Some(Self::RateLimited),
            4009 => Some(Self::SessionTimeout),
            4010 => Some(Self::InvalidShard),
            4011 => Some(Self::ShardingRequired),
            4012 => Some(Self::InvalidApiVersion),
            4013 => Some(Self::InvalidIntent),
            4014 => Some(Self::DisallowedIntent),
            4914 => Some(Self::BotOffline),
            4915 => Some(Self::BotBanned),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Reconnect disposition for this close code
    #[must_use]
    pub const fn disposition(self) -> CloseDisposition {
        match self {
            Self::InvalidSession | Self::InvalidSequence | Self::SessionTimeout => CloseDisposition::Fresh,
            Self::AuthenticationFailed => CloseDisposition::Reauthenticate,
            Self::InvalidShard
            | Self::ShardingRequired
            | Self::InvalidApiVersion
            | Self::InvalidIntent
            | Self::DisallowedIntent
            | Self::BotOffline
            | Self::BotBanned => CloseDisposition::Fatal,
            Self::UnknownOpcode | Self::DecodeError | Self::RateLimited => CloseDisposition::Resume,
        }
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownOpcode => "Invalid opcode",
            Self::DecodeError => "Invalid payload",
            Self::AuthenticationFailed => "Authentication failed",
            Self::InvalidSession => "Invalid session id",
            Self::InvalidSequence => "Invalid sequence number",
            Self::RateLimited => "Rate limited",
            Self::SessionTimeout => "Session timed out",
            Self::InvalidShard => "Invalid shard",
            Self::ShardingRequired => "Sharding required",
            Self::InvalidApiVersion => "Invalid gateway version",
            Self::InvalidIntent => "Invalid intent",
            Self::DisallowedIntent => "Intent not permitted",
            Self::BotOffline => "Bot offline",
            Self::BotBanned => "Bot banned",
        }
    }
}

/// Disposition for a raw close code; unknown and missing codes resume
#[must_use]
pub fn close_disposition(code: Option<u16>) -> CloseDisposition {
    match code {
        Some(code) if INTERNAL_ERROR_RANGE.contains(&code) => CloseDisposition::Resume,
        Some(code) => CloseCode::from_u16(code).map_or(CloseDisposition::Resume, CloseCode::disposition),
        None => CloseDisposition::Resume,
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({}): {}", self, self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_code_from_u16() {
        assert_eq!(CloseCode::from_u16(4004), Some(CloseCode::AuthenticationFailed));
        assert_eq!(CloseCode::from_u16(4915), Some(CloseCode::BotBanned));
        assert_eq!(CloseCode::from_u16(1000), None);
        assert_eq!(CloseCode::from_u16(4005), None);
    }

    #[test]
    fn test_fresh_codes() {
        for code in [4006, 4007, 4009] {
            assert_eq!(close_disposition(Some(code)), CloseDisposition::Fresh, "code {code}");
        }
    }

    #[test]
    fn test_fatal_codes() {
        for code in [4010, 4011, 4012, 4013, 4014, 4914, 4915] {
            assert_eq!(close_disposition(Some(code)), CloseDisposition::Fatal, "code {code}");
        }
    }

    #[test]
    fn test_authentication_failure_reauthenticates() {
        assert_eq!(close_disposition(Some(4004)), CloseDisposition::Reauthenticate);
    }

    #[test]
    fn test_resumable_codes() {
        for code in [1000, 1006, 4001, 4008, 4900, 4905, 4913] {
            assert_eq!(close_disposition(Some(code)), CloseDisposition::Resume, "code {code}");
        }
        assert_eq!(close_disposition(None), CloseDisposition::Resume);
    }

    #[test]
    fn test_close_code_display() {
        let display = CloseCode::DisallowedIntent.to_string();
        assert!(display.contains("4014"));
        assert!(display.contains("Intent not permitted"));
    }
}
