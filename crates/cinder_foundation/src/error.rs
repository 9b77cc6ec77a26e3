//! Error types for the Cinder core.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::id::{ComponentId, EntityId};

/// Result type alias using the Cinder error.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Cinder operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error, replacing any existing context.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Records an enclosing operation.
    ///
    /// The first call sets the operation; later calls push a frame so the
    /// innermost operation stays visible.
    #[must_use]
    pub fn during(mut self, operation: &'static str, variant: &'static str) -> Self {
        let ctx = self.context.take().unwrap_or_default();
        self.context = Some(if ctx.operation.is_some() {
            ctx.with_frame(format!("{operation} {variant}"))
        } else {
            ctx.with_operation(operation).with_variant(variant)
        });
        self
    }

    /// Attaches a component id to the existing context (creating one if absent).
    #[must_use]
    pub fn for_component(mut self, id: ComponentId) -> Self {
        let ctx = self.context.take().unwrap_or_default();
        self.context = Some(ctx.with_component(id));
        self
    }

    /// Creates a component-id lookup failure.
    #[must_use]
    pub fn not_found(id: ComponentId) -> Self {
        Self::new(ErrorKind::NotFound(Lookup::Id(id)))
    }

    /// Creates a by-entity lookup failure.
    #[must_use]
    pub fn not_found_for(entity: EntityId) -> Self {
        Self::new(ErrorKind::NotFound(Lookup::Entity(entity)))
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn entity_not_found(entity: EntityId) -> Self {
        Self::new(ErrorKind::EntityNotFound(entity))
    }

    /// Creates a storage failure from anything printable.
    #[must_use]
    pub fn storage(message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Storage(message.to_string()))
    }

    /// Creates a decode failure from anything printable.
    #[must_use]
    pub fn decode(message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Decode(message.to_string()))
    }

    /// Creates an encode failure from anything printable.
    #[must_use]
    pub fn encode(message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Encode(message.to_string()))
    }
}

/// How a missing component was looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// By component id.
    Id(ComponentId),
    /// By owning entity.
    Entity(EntityId),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Entity(entity) => write!(f, "{entity}"),
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// No component matched the lookup.
    #[error("component not found: {0}")]
    NotFound(Lookup),

    /// Entity is absent from a store or the hierarchy.
    #[error("{0} not found")]
    EntityNotFound(EntityId),

    /// An explicit component id is already taken in its store.
    #[error("duplicate component id {0}")]
    DuplicateId(ComponentId),

    /// A unique-per-entity store already holds a component for the entity.
    #[error("{0} already has a component of this kind")]
    UniqueViolation(EntityId),

    /// Installing the edge would make an entity its own ancestor.
    #[error("cyclic hierarchy: {child} is an ancestor of {parent}")]
    Cyclic {
        /// The requested parent.
        parent: EntityId,
        /// The requested child.
        child: EntityId,
    },

    /// The requested parent is not in the hierarchy.
    #[error("parent {0} is not in the hierarchy")]
    ParentMissing(EntityId),

    /// The child is already attached to a parent.
    #[error("{0} already has a parent")]
    AlreadyHasParent(EntityId),

    /// The root has no parent.
    #[error("{0} is the root and has no parent")]
    NoParent(EntityId),

    /// The hierarchy root cannot be deleted.
    #[error("{0} is the hierarchy root and cannot be deleted")]
    RootProtected(EntityId),

    /// An anchor component cannot be moved to another entity.
    #[error("anchor component cannot move from {from} to {to}")]
    AnchorMoved {
        /// The entity that currently owns the anchor.
        from: EntityId,
        /// The entity the update tried to move it to.
        to: EntityId,
    },

    /// A change event arrived for a component already buffered as deleted.
    #[error("{variant} component {id} changed after it was deleted")]
    ChangeAfterDelete {
        /// Component variant tag.
        variant: &'static str,
        /// Component id.
        id: ComponentId,
    },

    /// A component did not have the expected variant.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected variant tag.
        expected: &'static str,
        /// The variant tag actually found.
        actual: &'static str,
    },

    /// A persisted record could not be decoded.
    #[error("decode failure: {0}")]
    Decode(String),

    /// A component could not be encoded for persistence.
    #[error("encode failure: {0}")]
    Encode(String),

    /// The key-value store rejected an operation.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that failed (e.g. `add`, `delete`).
    pub operation: Option<&'static str>,
    /// The component variant involved.
    pub variant: Option<&'static str>,
    /// The component id involved, if known.
    pub component: Option<ComponentId>,
    /// Enclosing operations, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Sets the component variant.
    #[must_use]
    pub fn with_variant(mut self, variant: &'static str) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Sets the component id.
    #[must_use]
    pub fn with_component(mut self, id: ComponentId) -> Self {
        self.component = Some(id);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(op) = self.operation {
            write!(f, "in {op}")?;
            if let Some(variant) = self.variant {
                write!(f, " {variant}")?;
            }
            if let Some(id) = self.component {
                write!(f, " {id}")?;
            }
        }
        for frame in &self.stack {
            write!(f, "\n  in {frame}")?;
        }
        Ok(())
    }
}
