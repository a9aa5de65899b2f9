//! Dispatch routing
//!
//! Turns inbound dispatches into hierarchical named events and delivers them to
//! subscribers.

mod dispatch;
mod interceptor;
mod names;
mod router;

pub use dispatch::{Dispatch, DispatchEvent, RoutedDispatch};
pub use interceptor::{resolve_reply_target, DispatchInterceptor, ReplyTargetInterceptor};
pub use names::event_names;
pub use router::{DispatchRouter, SubscriptionId};
