//! Dispatch router
//!
//! Fans dispatches out to subscribers registered by [`EventName`]. A dispatch first passes
//! through the interceptor chain, then is published under every name produced by
//! [`event_names`], most specific first. Within one name, handlers run in registration
//! order; each handler's future is spawned so a slow subscriber never stalls the session.

use super::{event_names, Dispatch, DispatchEvent, DispatchInterceptor, ReplyTargetInterceptor, RoutedDispatch};
use bot_core::EventName;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::Instrument;

/// Handle returned by [`DispatchRouter::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(DispatchEvent) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Event subscriber registry
pub struct DispatchRouter {
    subscribers: RwLock<HashMap<EventName, Vec<(SubscriptionId, Handler)>>>,
    interceptors: RwLock<Vec<Arc<dyn DispatchInterceptor>>>,
    next_id: AtomicU64,
}

impl DispatchRouter {
    /// Create a router with the reply-target interceptor installed
    #[must_use]
    pub fn new() -> Self {
        let router = Self::bare();
        router.add_interceptor(ReplyTargetInterceptor);
        router
    }

    /// Create a router without any interceptor
    #[must_use]
    pub fn bare() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            interceptors: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Subscribe `handler` to events published under `name`
    pub fn on<F, Fut>(&self, name: impl Into<EventName>, handler: F) -> SubscriptionId
    where
        F: Fn(DispatchEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handler: Handler = Arc::new(move |event| handler(event).boxed());

        self.subscribers.write().entry(name.into()).or_default().push((id, handler));
        id
    }

    /// Remove a subscription; returns whether it existed
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let mut removed = false;

        subscribers.retain(|_, handlers| {
            let before = handlers.len();
            handlers.retain(|(handler_id, _)| *handler_id != id);
            removed |= handlers.len() != before;
            !handlers.is_empty()
        });

        removed
    }

    /// Append an interceptor to the chain
    pub fn add_interceptor<I>(&self, interceptor: I)
    where
        I: DispatchInterceptor + 'static,
    {
        self.interceptors.write().push(Arc::new(interceptor));
    }

    /// Number of handlers registered for `name`
    #[must_use]
    pub fn subscriber_count(&self, name: &EventName) -> usize {
        self.subscribers.read().get(name).map_or(0, Vec::len)
    }

    /// Intercept and publish a dispatch
    ///
    /// Must be called from within a tokio runtime. Returns the number of handlers invoked.
    pub fn route(&self, dispatch: Dispatch) -> usize {
        let event_type = dispatch.event_type.clone();
        let Some(dispatch) = self.intercept(dispatch) else {
            return 0;
        };

        let names = event_names(&dispatch.event_type);
        let routed = Arc::new(RoutedDispatch::from(dispatch));

        let delivered: usize = names
            .into_iter()
            .map(|name| self.deliver(name, &routed))
            .sum();

        tracing::trace!(event_type = %event_type, handlers = delivered, "Routed dispatch");
        delivered
    }

    /// Publish the terminal `session.dead` event, then `session`
    pub fn emit_session_dead(&self, reason: &str) -> usize {
        let routed = Arc::new(RoutedDispatch {
            event_type: "DEAD".to_string(),
            sequence: None,
            payload: json!({ "t": "DEAD", "reason": reason }),
            reply: None,
        });
        [EventName::SessionDead, EventName::Session]
            .into_iter()
            .map(|name| self.deliver(name, &routed))
            .sum()
    }

    fn intercept(&self, dispatch: Dispatch) -> Option<Dispatch> {
        let interceptors = self.interceptors.read().clone();
        let event_type = dispatch.event_type.clone();

        interceptors.iter().try_fold(dispatch, |dispatch, interceptor| {
            match std::panic::catch_unwind(AssertUnwindSafe(|| interceptor.intercept(dispatch))) {
                Ok(Ok(dispatch)) => Some(dispatch),
                Ok(Err(e)) => {
                    tracing::warn!(event_type = %event_type, error = %e, "Interceptor rejected dispatch, dropping");
                    None
                }
                Err(_) => {
                    tracing::error!(event_type = %event_type, "Interceptor panicked, dropping dispatch");
                    None
                }
            }
        })
    }

    fn deliver(&self, name: EventName, routed: &Arc<RoutedDispatch>) -> usize {
        let handlers: Vec<Handler> = match self.subscribers.read().get(&name) {
            Some(handlers) => handlers.iter().map(|(_, handler)| Arc::clone(handler)).collect(),
            None => return 0,
        };

        for handler in &handlers {
            let event = DispatchEvent::new(name.clone(), Arc::clone(routed));

            let future = match std::panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(future) => future,
                Err(_) => {
                    tracing::error!(event = %name, "Subscriber panicked");
                    continue;
                }
            };

            let event_name = name.clone();
            tokio::spawn(
                async move {
                    match AssertUnwindSafe(future).catch_unwind().await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            tracing::warn!(event = %event_name, error = %e, "Subscriber failed");
                        }
                        Err(_) => {
                            tracing::error!(event = %event_name, "Subscriber panicked");
                        }
                    }
                }
                .in_current_span(),
            );
        }

        handlers.len()
    }
}

impl Default for DispatchRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DispatchRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchRouter")
            .field("names", &self.subscribers.read().len())
            .field("interceptors", &self.interceptors.read().len())
            .finish()
    }
}
