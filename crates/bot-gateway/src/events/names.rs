//! Event type to router name expansion

use bot_core::EventName;

/// Expand a dispatch type into the names it is published under, most specific first
///
/// `GUILD_MEMBER_ADD` yields `guild.member.add`, `guild.member`, `guild`. A single-segment
/// type is a session lifecycle event: `READY` yields `session.ready`, `session`.
#[must_use]
pub fn event_names(event_type: &str) -> Vec<EventName> {
    let lowered = event_type.to_ascii_lowercase();
    let mut segments: Vec<&str> = lowered.split('_').filter(|s| !s.is_empty()).collect();

    if segments.len() == 1 {
        segments.insert(0, "session");
    }

    (1..=segments.len())
        .rev()
        .map(|len| EventName::from(segments[..len].join(".")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_at_message_create() {
        assert_eq!(event_names("GROUP_AT_MESSAGE_CREATE"), vec![
            EventName::GroupAtMessageCreate,
            EventName::GroupAtMessage,
            EventName::GroupAt,
            EventName::Group,
        ]);
    }

    #[test]
    fn test_guild_member_add() {
        let names: Vec<String> = event_names("GUILD_MEMBER_ADD").iter().map(ToString::to_string).collect();
        assert_eq!(names, ["guild.member.add", "guild.member", "guild"]);
    }

    #[test]
    fn test_single_segment_is_session_event() {
        assert_eq!(event_names("READY"), vec![EventName::SessionReady, EventName::Session]);
        assert_eq!(event_names("RESUMED"), vec![EventName::SessionResumed, EventName::Session]);
    }

    #[test]
    fn test_unknown_type_falls_back_to_other() {
        let names = event_names("PUBLIC_CHANNEL_THING");
        assert_eq!(names[0], EventName::Other("public.channel.thing".to_string()));
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_empty_type() {
        assert!(event_names("").is_empty());
        assert!(event_names("__").is_empty());
    }
}
