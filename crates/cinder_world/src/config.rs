//! Configuration for the ECS facade.

use cinder_foundation::EntityId;

/// Configuration for a [`crate::World`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    /// Root of the entity hierarchy. Allocation starts just above it.
    pub root: EntityId,

    /// Emit a `trace` log line for every published event.
    pub trace_events: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            root: EntityId::ROOT,
            trace_events: false,
        }
    }
}

impl WorldConfig {
    /// Creates a configuration for debugging: every event is traced.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            trace_events: true,
            ..Self::default()
        }
    }

    /// Builder method to set the hierarchy root.
    #[must_use]
    pub fn with_root(mut self, root: EntityId) -> Self {
        self.root = root;
        self
    }

    /// Builder method to toggle event tracing.
    #[must_use]
    pub fn with_trace_events(mut self, trace_events: bool) -> Self {
        self.trace_events = trace_events;
        self
    }
}
