//! Variant descriptors and the component sum type.
//!
//! The set of component variants is closed. [`ComponentKind`] names each
//! one, [`AnyComponent`] carries a value of any of them, and [`Variant`]
//! connects a concrete type to its kind, its store, and its event arm.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use cinder_foundation::{ComponentId, EntityId, Error, ErrorKind, Result};
use cinder_storage::{Component, ComponentStore};

use crate::components::{Controllable, Position, Skeleton, Velocity};
use crate::world::World;

/// Tag of a component variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    /// [`Position`], the hierarchy anchor.
    Position,
    /// [`Controllable`].
    Controllable,
    /// [`Skeleton`].
    Skeleton,
    /// [`Velocity`].
    Velocity,
}

impl ComponentKind {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Position,
        Self::Controllable,
        Self::Skeleton,
        Self::Velocity,
    ];

    /// Returns the variant's string tag, also used as its bucket name.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Controllable => "controllable",
            Self::Skeleton => "skeleton",
            Self::Velocity => "velocity",
        }
    }

    /// Parses a string tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A component of any variant.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyComponent {
    /// A [`Position`].
    Position(Position),
    /// A [`Controllable`].
    Controllable(Controllable),
    /// A [`Skeleton`].
    Skeleton(Skeleton),
    /// A [`Velocity`].
    Velocity(Velocity),
}

impl AnyComponent {
    /// Returns the variant tag.
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Position(_) => ComponentKind::Position,
            Self::Controllable(_) => ComponentKind::Controllable,
            Self::Skeleton(_) => ComponentKind::Skeleton,
            Self::Velocity(_) => ComponentKind::Velocity,
        }
    }

    /// Returns the component id.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        match self {
            Self::Position(c) => c.id(),
            Self::Controllable(c) => c.id(),
            Self::Skeleton(c) => c.id(),
            Self::Velocity(c) => c.id(),
        }
    }

    /// Returns the owning entity.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Position(c) => c.entity(),
            Self::Controllable(c) => c.entity(),
            Self::Skeleton(c) => c.entity(),
            Self::Velocity(c) => c.entity(),
        }
    }

    /// Borrows the value as a concrete variant.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the value holds a different variant.
    pub fn downcast<V: Variant>(&self) -> Result<&V> {
        V::from_any(self).ok_or_else(|| {
            Error::new(ErrorKind::TypeMismatch {
                expected: V::KIND.tag(),
                actual: self.kind().tag(),
            })
        })
    }
}

/// A concrete component variant managed by the [`World`].
pub trait Variant:
    Component + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Into<AnyComponent>
{
    /// The variant's tag.
    const KIND: ComponentKind;

    /// At most one component of this variant per entity.
    const UNIQUE: bool = false;

    /// Components of this variant place their entity in the hierarchy.
    const ANCHOR: bool = false;

    /// The parent entity carried by the value, for variants that have one.
    fn parent(&self) -> Option<EntityId> {
        None
    }

    /// Borrows the concrete value out of the sum type.
    fn from_any(any: &AnyComponent) -> Option<&Self>;

    /// Returns the world's store for this variant.
    fn store(world: &World) -> &ComponentStore<Self>;
}

macro_rules! variant_arm {
    ($ty:ident) => {
        impl From<$ty> for AnyComponent {
            fn from(value: $ty) -> Self {
                Self::$ty(value)
            }
        }
    };
}

variant_arm!(Position);
variant_arm!(Controllable);
variant_arm!(Skeleton);
variant_arm!(Velocity);

impl Variant for Position {
    const KIND: ComponentKind = ComponentKind::Position;
    const UNIQUE: bool = true;
    const ANCHOR: bool = true;

    fn parent(&self) -> Option<EntityId> {
        Some(self.parent)
    }

    fn from_any(any: &AnyComponent) -> Option<&Self> {
        match any {
            AnyComponent::Position(c) => Some(c),
            _ => None,
        }
    }

    fn store(world: &World) -> &ComponentStore<Self> {
        &world.positions
    }
}

impl Variant for Controllable {
    const KIND: ComponentKind = ComponentKind::Controllable;
    const UNIQUE: bool = true;

    fn from_any(any: &AnyComponent) -> Option<&Self> {
        match any {
            AnyComponent::Controllable(c) => Some(c),
            _ => None,
        }
    }

    fn store(world: &World) -> &ComponentStore<Self> {
        &world.controllables
    }
}

impl Variant for Skeleton {
    const KIND: ComponentKind = ComponentKind::Skeleton;

    fn from_any(any: &AnyComponent) -> Option<&Self> {
        match any {
            AnyComponent::Skeleton(c) => Some(c),
            _ => None,
        }
    }

    fn store(world: &World) -> &ComponentStore<Self> {
        &world.skeletons
    }
}

impl Variant for Velocity {
    const KIND: ComponentKind = ComponentKind::Velocity;

    fn from_any(any: &AnyComponent) -> Option<&Self> {
        match any {
            AnyComponent::Velocity(c) => Some(c),
            _ => None,
        }
    }

    fn store(world: &World) -> &ComponentStore<Self> {
        &world.velocities
    }
}
