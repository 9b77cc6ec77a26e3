//! Entity id allocation.
//!
//! The `EntityAllocator` tracks the highest entity id seen so far, whether it
//! was allocated here or arrived on an externally supplied component, and
//! hands out the next id above it. Ids are never reused.

use std::sync::atomic::{AtomicU32, Ordering};

use cinder_foundation::{EntityId, Error, ErrorKind, Result};

/// Monotonic entity id allocator.
#[derive(Debug)]
pub struct EntityAllocator {
    high_water: AtomicU32,
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new(EntityId::ROOT)
    }
}

impl EntityAllocator {
    /// Creates an allocator whose first allocation is `floor + 1`.
    #[must_use]
    pub fn new(floor: EntityId) -> Self {
        Self {
            high_water: AtomicU32::new(floor.raw()),
        }
    }

    /// Allocates the next entity id.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the id space is exhausted.
    pub fn allocate(&self) -> Result<EntityId> {
        self.high_water
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(1)
            })
            .map(|previous| EntityId::new(previous + 1))
            .map_err(|_| Error::new(ErrorKind::Internal("entity ids exhausted".into())))
    }

    /// Records an id seen on an external component so later allocations
    /// stay above it.
    pub fn observe(&self, entity: EntityId) {
        self.high_water.fetch_max(entity.raw(), Ordering::AcqRel);
    }

    /// Returns the highest id allocated or observed.
    #[must_use]
    pub fn high_water(&self) -> EntityId {
        EntityId::new(self.high_water.load(Ordering::Acquire))
    }
}
