//! Component variants.

use serde::{Deserialize, Serialize};

use cinder_foundation::{ComponentId, EntityId};
use cinder_storage::Component;

use crate::variant::ComponentKind;

macro_rules! component {
    ($ty:ident, $kind:ident) => {
        impl Component for $ty {
            const NAME: &'static str = ComponentKind::$kind.tag();

            fn id(&self) -> ComponentId {
                self.id
            }

            fn set_id(&mut self, id: ComponentId) {
                self.id = id;
            }

            fn entity(&self) -> EntityId {
                self.entity
            }
        }
    };
}

/// Location of an entity relative to the world.
///
/// Position is the hierarchy anchor: adding one attaches its entity under
/// `parent`, and deleting one removes the entity's whole subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Component id.
    pub id: ComponentId,
    /// Owning entity.
    pub entity: EntityId,
    /// Parent entity in the hierarchy.
    pub parent: EntityId,
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Position {
    /// Creates an unattached position; [`crate::World::create_entity`]
    /// fills in the id, entity, and parent.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            id: ComponentId::UNASSIGNED,
            entity: EntityId::ROOT,
            parent: EntityId::ROOT,
            x,
            y,
        }
    }

    /// Creates a position for `entity` under `parent`.
    #[must_use]
    pub fn at(entity: EntityId, parent: EntityId, x: f32, y: f32) -> Self {
        Self {
            entity,
            parent,
            ..Self::new(x, y)
        }
    }
}

component!(Position, Position);

/// Marks an entity as driven by player input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Controllable {
    /// Component id.
    pub id: ComponentId,
    /// Owning entity.
    pub entity: EntityId,
    /// Movement speed in units per tick.
    pub speed: f32,
}

impl Controllable {
    /// Creates a controllable marker with unit speed.
    #[must_use]
    pub fn on(entity: EntityId) -> Self {
        Self {
            id: ComponentId::UNASSIGNED,
            entity,
            speed: 1.0,
        }
    }
}

component!(Controllable, Controllable);

/// Sprite-sheet animation state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    /// Component id.
    pub id: ComponentId,
    /// Owning entity.
    pub entity: EntityId,
    /// Sprite sheet name.
    pub sheet: String,
    /// Current animation frame.
    pub frame: u16,
    /// Mirror horizontally.
    pub flipped: bool,
}

impl Skeleton {
    /// Creates a skeleton on the first frame of `sheet`.
    #[must_use]
    pub fn on(entity: EntityId, sheet: impl Into<String>) -> Self {
        Self {
            id: ComponentId::UNASSIGNED,
            entity,
            sheet: sheet.into(),
            frame: 0,
            flipped: false,
        }
    }
}

component!(Skeleton, Skeleton);

/// Per-tick displacement. Transient; not persisted by default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    /// Component id.
    pub id: ComponentId,
    /// Owning entity.
    pub entity: EntityId,
    /// Horizontal displacement.
    pub dx: f32,
    /// Vertical displacement.
    pub dy: f32,
}

impl Velocity {
    /// Creates a velocity for `entity`.
    #[must_use]
    pub fn on(entity: EntityId, dx: f32, dy: f32) -> Self {
        Self {
            id: ComponentId::UNASSIGNED,
            entity,
            dx,
            dy,
        }
    }
}

component!(Velocity, Velocity);
