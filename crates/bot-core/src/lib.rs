//! # bot-core
//!
//! Domain layer containing the value objects shared by the gateway engine and the REST client.
//! This crate has zero dependencies on infrastructure (network, runtime, etc.).

pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use events::EventName;
pub use value_objects::{Correlation, IntentParseError, Intents, ReplyTarget};
