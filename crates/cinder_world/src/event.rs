//! Component events and the matchers that select them.

use std::collections::HashSet;
use std::fmt;

use cinder_bus::Matcher;
use cinder_foundation::{ComponentId, EntityId, Result};

use crate::variant::{AnyComponent, ComponentKind, Variant};

/// The lifecycle transition an event reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// The component was added.
    Created,
    /// The component was replaced.
    Updated,
    /// The component was removed.
    Deleted,
}

impl Action {
    /// Every action.
    pub const ALL: [Self; 3] = [Self::Created, Self::Updated, Self::Deleted];

    /// Returns the tag suffix (`created`, `updated`, `deleted`).
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Builds the `<variant>.<action>` tag string.
#[must_use]
pub fn tag_for(kind: ComponentKind, action: Action) -> String {
    format!("{}.{}", kind.tag(), action.suffix())
}

/// A mutation of one component, carrying a snapshot of its value.
///
/// Created and updated events carry the stored value; deleted events carry
/// the last value seen before removal.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentEvent {
    tag: String,
    action: Action,
    component: AnyComponent,
}

impl ComponentEvent {
    /// Creates an event for a component snapshot.
    #[must_use]
    pub fn new(action: Action, component: AnyComponent) -> Self {
        Self {
            tag: tag_for(component.kind(), action),
            action,
            component,
        }
    }

    /// The `<variant>.<action>` tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The transition.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// True for deleted events.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.action == Action::Deleted
    }

    /// The component's variant.
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        self.component.kind()
    }

    /// The component's id.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.component.id()
    }

    /// The owning entity.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.component.entity()
    }

    /// The component snapshot.
    #[must_use]
    pub fn component(&self) -> &AnyComponent {
        &self.component
    }

    /// Borrows the snapshot as a concrete variant.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the event is for a different variant.
    pub fn component_as<V: Variant>(&self) -> Result<&V> {
        self.component.downcast()
    }
}

/// Matches events whose tag is one of a set.
#[derive(Clone, Debug, Default)]
pub struct TagMatcher {
    tags: HashSet<String>,
}

impl TagMatcher {
    /// Matches any of the given tags.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Matches the given actions on one variant.
    #[must_use]
    pub fn of(kind: ComponentKind, actions: &[Action]) -> Self {
        Self::new(actions.iter().map(|a| tag_for(kind, *a)))
    }
}

impl Matcher<ComponentEvent> for TagMatcher {
    fn matches(&self, event: &ComponentEvent) -> bool {
        self.tags.contains(event.tag())
    }
}

/// Matches every event for a set of variants.
#[derive(Clone, Debug, Default)]
pub struct KindMatcher {
    kinds: Vec<ComponentKind>,
}

impl KindMatcher {
    /// Matches any of the given variants.
    pub fn new(kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }
}

impl Matcher<ComponentEvent> for KindMatcher {
    fn matches(&self, event: &ComponentEvent) -> bool {
        self.kinds.contains(&event.kind())
    }
}
