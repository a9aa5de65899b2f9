//! Event naming shared by the gateway router and its subscribers

mod event_name;

pub use event_name::EventName;
