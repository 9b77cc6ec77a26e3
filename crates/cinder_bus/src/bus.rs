//! The event bus.
//!
//! Publishing snapshots the subscription list under a read lock, releases
//! the lock, and only then runs handlers. A handler may therefore subscribe
//! or unsubscribe without deadlocking; the change takes effect from the
//! next publish.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use cinder_foundation::Result;

use crate::matcher::Matcher;

/// Identifier of a subscription. Starts at 1 and increases monotonically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Callback invoked for matching events.
pub type Handler<E> = dyn Fn(&E) -> Result<()> + Send + Sync;

/// A registered matcher/handler pair.
pub struct Subscription<E> {
    id: SubscriptionId,
    matcher: Arc<dyn Matcher<E>>,
    handler: Arc<Handler<E>>,
}

impl<E> Subscription<E> {
    /// Returns the subscription id.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Checks whether this subscription accepts an event.
    #[must_use]
    pub fn matches(&self, event: &E) -> bool {
        self.matcher.matches(event)
    }

    /// Invokes the handler directly.
    ///
    /// # Errors
    ///
    /// Returns whatever the handler returns.
    pub fn deliver(&self, event: &E) -> Result<()> {
        (self.handler)(event)
    }
}

impl<E> Clone for Subscription<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            matcher: Arc::clone(&self.matcher),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Thread-safe publish/subscribe bus for events of type `E`.
pub struct EventBus<E> {
    next_id: AtomicU64,
    /// Kept sorted by id (ids are only ever appended).
    subscriptions: RwLock<Vec<Subscription<E>>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.read().len())
            .finish_non_exhaustive()
    }
}

impl<E> EventBus<E> {
    /// Creates a bus with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscriptions: RwLock::new(Vec::new()),
        }
    }

    /// Registers a handler for events accepted by `matcher`.
    pub fn subscribe<M, H>(&self, matcher: M, handler: H) -> SubscriptionId
    where
        M: Matcher<E> + 'static,
        H: Fn(&E) -> Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut subs = self.subscriptions.write();
        let subscription = Subscription {
            id,
            matcher: Arc::new(matcher),
            handler: Arc::new(handler),
        };
        // Concurrent subscribers may take the lock out of id order.
        let pos = subs.partition_point(|s| s.id < id);
        subs.insert(pos, subscription);
        tracing::debug!(%id, "subscribed");
        id
    }

    /// Removes a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.write();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        if subs.len() != before {
            tracing::debug!(%id, "unsubscribed");
        }
    }

    /// Delivers an event to every matching subscription in id order.
    ///
    /// # Errors
    ///
    /// Stops at the first handler error and returns it; later handlers do
    /// not run.
    pub fn publish(&self, event: &E) -> Result<()> {
        let snapshot = self.subscriptions.read().clone();
        for sub in snapshot.iter().filter(|s| s.matches(event)) {
            sub.deliver(event)?;
        }
        Ok(())
    }

    /// Returns a copy of the current subscription list, in id order.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription<E>> {
        self.subscriptions.read().clone()
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Returns true if nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.read().is_empty()
    }
}
