use async_trait::async_trait;
use sparql_bus_common::ActionContext;
use sparql_bus_core::Action;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Requests that cached state derived from a resource is discarded.
#[derive(Clone, Debug)]
pub struct HttpInvalidateAction {
    /// The invalidated URL. If `None`, all cached state is invalidated.
    pub url: Option<String>,
    pub context: ActionContext,
}

impl HttpInvalidateAction {
    /// Invalidates the state derived from `url`.
    pub fn url(url: impl Into<String>, context: ActionContext) -> Self {
        Self {
            url: Some(url.into()),
            context,
        }
    }

    /// Invalidates all cached state.
    pub fn all(context: ActionContext) -> Self {
        Self { url: None, context }
    }
}

impl Action for HttpInvalidateAction {
    fn context(&self) -> &ActionContext {
        &self.context
    }
}

/// Reacts to invalidations published on an [HttpInvalidator].
#[async_trait]
pub trait InvalidateListener: Debug + Send + Sync {
    async fn on_invalidate(&self, action: &HttpInvalidateAction);
}

type Listeners = Mutex<Vec<(u64, Arc<dyn InvalidateListener>)>>;

/// A broadcast channel for [HttpInvalidateAction]s.
///
/// Every registered listener is notified of every invalidation, in registration order.
#[derive(Debug, Default)]
pub struct HttpInvalidator {
    listeners: Arc<Listeners>,
    next_id: AtomicU64,
}

impl HttpInvalidator {
    /// Creates a new [HttpInvalidator] without listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. The listener stays registered until the returned handle is dropped.
    #[must_use = "dropping the handle unregisters the listener"]
    pub fn add_listener(&self, listener: Arc<dyn InvalidateListener>) -> InvalidateListenerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        tracing::debug!(id, "Registered invalidate listener");
        InvalidateListenerHandle {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Notifies all listeners of `action`.
    ///
    /// Listeners that are registered while the invalidation is in progress are not notified.
    pub async fn invalidate(&self, action: &HttpInvalidateAction) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect::<Vec<_>>();
        tracing::debug!(
            url = action.url.as_deref().unwrap_or("*"),
            listeners = listeners.len(),
            "Invalidating"
        );
        for listener in listeners {
            listener.on_invalidate(action).await;
        }
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Keeps a listener registered on an [HttpInvalidator].
#[derive(Debug)]
pub struct InvalidateListenerHandle {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Drop for InvalidateListenerHandle {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
            tracing::debug!(id = self.id, "Unregistered invalidate listener");
        }
    }
}
