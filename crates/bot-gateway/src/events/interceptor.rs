//! Dispatch interceptors
//!
//! Interceptors run in registration order before a dispatch is routed. Each one receives
//! the dispatch and returns it, possibly transformed. The default
//! [`ReplyTargetInterceptor`] attaches a [`ReplyTarget`] to message-shaped events.

use super::Dispatch;
use bot_core::{Correlation, ReplyTarget};
use serde_json::Value;

/// A transformation applied to every dispatch before routing
///
/// An error drops the dispatch.
pub trait DispatchInterceptor: Send + Sync {
    fn intercept(&self, dispatch: Dispatch) -> anyhow::Result<Dispatch>;
}

impl<F> DispatchInterceptor for F
where
    F: Fn(Dispatch) -> anyhow::Result<Dispatch> + Send + Sync,
{
    fn intercept(&self, dispatch: Dispatch) -> anyhow::Result<Dispatch> {
        self(dispatch)
    }
}

/// Attaches the reply target resolved by [`resolve_reply_target`]
///
/// A dispatch that already carries a target is left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyTargetInterceptor;

impl DispatchInterceptor for ReplyTargetInterceptor {
    fn intercept(&self, mut dispatch: Dispatch) -> anyhow::Result<Dispatch> {
        if dispatch.reply.is_none() {
            dispatch.reply = resolve_reply_target(&dispatch.event_type, &dispatch.data);
        }
        Ok(dispatch)
    }
}

fn str_field(payload: &Value, field: &str) -> Option<String> {
    payload.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Decide where a reply to `event_type` goes
///
/// Returns `None` for events that cannot be replied to or whose payload lacks the
/// destination or correlation id.
#[must_use]
pub fn resolve_reply_target(event_type: &str, payload: &Value) -> Option<ReplyTarget> {
    let id = str_field(payload, "id")?;

    match event_type {
        "MESSAGE_CREATE" | "AT_MESSAGE_CREATE" => Some(ReplyTarget::Channel {
            channel_id: str_field(payload, "channel_id")?,
            correlation: Correlation::MsgId(id),
        }),
        "DIRECT_MESSAGE_CREATE" => Some(ReplyTarget::DirectMessage {
            guild_id: str_field(payload, "guild_id")?,
            correlation: Correlation::MsgId(id),
        }),
        "GROUP_AT_MESSAGE_CREATE" => Some(ReplyTarget::Group {
            group_openid: str_field(payload, "group_openid")?,
            correlation: Correlation::MsgId(id),
        }),
        "C2C_MESSAGE_CREATE" => Some(ReplyTarget::User {
            user_openid: payload
                .get("author")
                .and_then(|author| str_field(author, "user_openid"))?,
            correlation: Correlation::MsgId(id),
        }),
        "GUILD_MEMBER_ADD"
        | "GUILD_MEMBER_UPDATE"
        | "GUILD_MEMBER_REMOVE"
        | "MESSAGE_REACTION_ADD"
        | "MESSAGE_REACTION_REMOVE"
        | "FORUM_THREAD_CREATE"
        | "FORUM_THREAD_UPDATE"
        | "FORUM_THREAD_DELETE"
        | "FORUM_POST_CREATE"
        | "FORUM_POST_DELETE"
        | "FORUM_REPLY_CREATE"
        | "FORUM_REPLY_DELETE" => Some(ReplyTarget::Channel {
            channel_id: str_field(payload, "channel_id")?,
            correlation: Correlation::EventId(id),
        }),
        _ => None,
    }
}
