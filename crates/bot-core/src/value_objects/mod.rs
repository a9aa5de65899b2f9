//! Value objects - immutable types that represent domain concepts

mod intents;
mod reply_target;

pub use intents::{IntentParseError, Intents};
pub use reply_target::{Correlation, ReplyTarget};
