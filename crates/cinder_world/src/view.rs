//! Read-only access to a variant's store.

use cinder_foundation::{ComponentId, EntityId, Result};
use cinder_storage::{ComponentStore, Uniqueness};

use crate::variant::Variant;

/// A borrowed, query-only view of one variant's store.
///
/// Writes go through [`World`](crate::World) so that the hierarchy and the
/// event bus stay in step with the store.
#[derive(Debug)]
pub struct StoreView<'w, V: Variant> {
    store: &'w ComponentStore<V>,
}

impl<V: Variant> Clone for StoreView<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: Variant> Copy for StoreView<'_, V> {}

impl<'w, V: Variant> StoreView<'w, V> {
    pub(crate) fn new(store: &'w ComponentStore<V>) -> Self {
        Self { store }
    }

    /// Returns the store's uniqueness policy.
    #[must_use]
    pub fn uniqueness(&self) -> Uniqueness {
        self.store.uniqueness()
    }

    /// Returns a copy of the component with the given id.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is absent.
    pub fn get(&self, id: ComponentId) -> Result<V> {
        self.store.get(id)
    }

    /// Returns the first component attached to an entity.
    ///
    /// # Errors
    ///
    /// `EntityNotFound` if the entity has none.
    pub fn first(&self, entity: EntityId) -> Result<V> {
        self.store.first(entity)
    }

    /// Returns every component ordered by id.
    #[must_use]
    pub fn list(&self) -> Vec<V> {
        self.store.list()
    }

    /// Returns every component on an entity, in insertion order.
    #[must_use]
    pub fn list_by_entity(&self, entity: EntityId) -> Vec<V> {
        self.store.list_by_entity(entity)
    }

    /// Checks whether a component id is present.
    #[must_use]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.store.contains(id)
    }

    /// Returns the entities holding at least one component, ascending.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityId> {
        self.store.entities()
    }

    /// Returns the number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if there are no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
