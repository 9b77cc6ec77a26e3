//! Event matchers.

use std::fmt;
use std::sync::Arc;

/// Decides whether a subscription receives an event.
///
/// Any `Fn(&E) -> bool` closure is a matcher.
pub trait Matcher<E>: Send + Sync {
    /// Returns true if the event should be delivered.
    fn matches(&self, event: &E) -> bool;
}

impl<E, F> Matcher<E> for F
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn matches(&self, event: &E) -> bool {
        self(event)
    }
}

/// Matches every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct Always;

impl<E> Matcher<E> for Always {
    fn matches(&self, _event: &E) -> bool {
        true
    }
}

/// Matches when any inner matcher does. Empty matches nothing.
pub struct AnyOf<E> {
    matchers: Vec<Arc<dyn Matcher<E>>>,
}

impl<E> AnyOf<E> {
    /// Creates an empty disjunction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    /// Adds an alternative.
    #[must_use]
    pub fn or(mut self, matcher: impl Matcher<E> + 'static) -> Self {
        self.matchers.push(Arc::new(matcher));
        self
    }

    /// Returns the number of alternatives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Returns true if there are no alternatives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl<E> Default for AnyOf<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for AnyOf<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyOf")
            .field("alternatives", &self.matchers.len())
            .finish()
    }
}

impl<E> Matcher<E> for AnyOf<E> {
    fn matches(&self, event: &E) -> bool {
        self.matchers.iter().any(|m| m.matches(event))
    }
}
