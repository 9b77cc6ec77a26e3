//! Per-variant component storage.
//!
//! A [`ComponentStore`] holds every component of one variant. The primary
//! index is ordered by component id; a secondary index maps each entity to
//! its components in insertion order. Both indices live behind one
//! read/write lock, so every operation is a single critical section.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use cinder_foundation::{ComponentId, EntityId, Error, ErrorKind, Result};

/// A value that can live in a [`ComponentStore`].
pub trait Component: Clone + Send + Sync + 'static {
    /// Variant tag, used in error context and bucket names.
    const NAME: &'static str;

    /// The component's id within its store (zero if unassigned).
    fn id(&self) -> ComponentId;

    /// Overwrites the component's id. Called by the store on assignment.
    fn set_id(&mut self, id: ComponentId);

    /// The entity this component is attached to.
    fn entity(&self) -> EntityId;
}

/// Whether an entity may hold more than one component from a store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Uniqueness {
    /// Any number of components per entity.
    #[default]
    Shared,
    /// At most one component per entity.
    PerEntity,
}

#[derive(Debug)]
struct Indices<T> {
    /// Primary index: component id -> component.
    by_id: BTreeMap<ComponentId, T>,
    /// Secondary index: entity -> component ids in insertion order.
    by_entity: HashMap<EntityId, Vec<ComponentId>>,
    /// Next candidate for id assignment.
    next_id: u32,
}

impl<T> Default for Indices<T> {
    fn default() -> Self {
        Self {
            by_id: BTreeMap::new(),
            by_entity: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Indices<T> {
    fn occupied(&self, entity: EntityId) -> bool {
        self.by_entity.get(&entity).is_some_and(|ids| !ids.is_empty())
    }

    fn assign_id(&mut self) -> Result<ComponentId> {
        let mut candidate = self.next_id;
        while self.by_id.contains_key(&ComponentId::new(candidate)) {
            candidate = candidate
                .checked_add(1)
                .ok_or_else(|| Error::new(ErrorKind::Internal("component ids exhausted".into())))?;
        }
        self.next_id = candidate.saturating_add(1);
        Ok(ComponentId::new(candidate))
    }

    fn unlink(&mut self, entity: EntityId, id: ComponentId) {
        if let Some(ids) = self.by_entity.get_mut(&entity) {
            ids.retain(|existing| *existing != id);
            if ids.is_empty() {
                self.by_entity.remove(&entity);
            }
        }
    }
}

/// Indexed container for a single component variant.
///
/// Safe for many concurrent readers or one writer. Values are cloned out;
/// no caller code runs while the lock is held.
#[derive(Debug)]
pub struct ComponentStore<T> {
    uniqueness: Uniqueness,
    indices: RwLock<Indices<T>>,
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new(Uniqueness::Shared)
    }
}

impl<T: Component> ComponentStore<T> {
    /// Creates an empty store with the given uniqueness policy.
    #[must_use]
    pub fn new(uniqueness: Uniqueness) -> Self {
        Self {
            uniqueness,
            indices: RwLock::new(Indices::default()),
        }
    }

    /// Creates an empty store allowing one component per entity.
    #[must_use]
    pub fn unique() -> Self {
        Self::new(Uniqueness::PerEntity)
    }

    /// Returns the store's uniqueness policy.
    #[must_use]
    pub fn uniqueness(&self) -> Uniqueness {
        self.uniqueness
    }

    /// Inserts a component and returns its id.
    ///
    /// An unassigned id is replaced by the next id from the store's counter.
    /// Explicit ids are kept as given and push the counter past them, so an
    /// id is never handed out twice in one session.
    ///
    /// # Errors
    ///
    /// - `UniqueViolation` if the store is unique-per-entity and the entity
    ///   already has a component here
    /// - `DuplicateId` if the explicit id is already present
    pub fn add(&self, mut value: T) -> Result<ComponentId> {
        let mut idx = self.indices.write();
        let entity = value.entity();

        if self.uniqueness == Uniqueness::PerEntity && idx.occupied(entity) {
            return Err(Error::new(ErrorKind::UniqueViolation(entity)));
        }

        let id = if value.id().is_unassigned() {
            let id = idx.assign_id()?;
            value.set_id(id);
            id
        } else {
            let id = value.id();
            if idx.by_id.contains_key(&id) {
                return Err(Error::new(ErrorKind::DuplicateId(id)));
            }
            idx.next_id = idx.next_id.max(id.raw().saturating_add(1));
            id
        };

        idx.by_id.insert(id, value);
        idx.by_entity.entry(entity).or_default().push(id);
        Ok(id)
    }

    /// Returns a copy of the component with the given id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is absent.
    pub fn get(&self, id: ComponentId) -> Result<T> {
        self.indices
            .read()
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(id))
    }

    /// Replaces the component with the same id, returning the previous value.
    ///
    /// If the entity field changed, the component moves to the tail of the
    /// new entity's list.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the id is absent
    /// - `UniqueViolation` if the move would give the new entity a second
    ///   component under a unique-per-entity policy
    pub fn update(&self, value: T) -> Result<T> {
        let mut idx = self.indices.write();
        let id = value.id();
        let old_entity = idx
            .by_id
            .get(&id)
            .map(Component::entity)
            .ok_or_else(|| Error::not_found(id))?;
        let new_entity = value.entity();

        if old_entity != new_entity {
            if self.uniqueness == Uniqueness::PerEntity && idx.occupied(new_entity) {
                return Err(Error::new(ErrorKind::UniqueViolation(new_entity)));
            }
            idx.unlink(old_entity, id);
            idx.by_entity.entry(new_entity).or_default().push(id);
        }

        idx.by_id
            .insert(id, value)
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("{id} vanished during update"))))
    }

    /// Removes the component with the given id and returns it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is absent.
    pub fn delete(&self, id: ComponentId) -> Result<T> {
        let mut idx = self.indices.write();
        let value = idx.by_id.remove(&id).ok_or_else(|| Error::not_found(id))?;
        idx.unlink(value.entity(), id);
        Ok(value)
    }

    /// Returns every component ordered by ascending id.
    #[must_use]
    pub fn list(&self) -> Vec<T> {
        self.indices.read().by_id.values().cloned().collect()
    }

    /// Returns the first component (by insertion order) attached to an entity.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the entity has no components here.
    pub fn first(&self, entity: EntityId) -> Result<T> {
        let idx = self.indices.read();
        idx.by_entity
            .get(&entity)
            .and_then(|ids| ids.first())
            .and_then(|id| idx.by_id.get(id))
            .cloned()
            .ok_or_else(|| Error::entity_not_found(entity))
    }

    /// Returns every component attached to an entity, in insertion order.
    #[must_use]
    pub fn list_by_entity(&self, entity: EntityId) -> Vec<T> {
        let idx = self.indices.read();
        idx.by_entity
            .get(&entity)
            .into_iter()
            .flatten()
            .filter_map(|id| idx.by_id.get(id).cloned())
            .collect()
    }

    /// Removes every component attached to an entity, returning them in
    /// insertion order.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the entity has no components here.
    pub fn delete_by_entity(&self, entity: EntityId) -> Result<Vec<T>> {
        let mut idx = self.indices.write();
        let ids = idx
            .by_entity
            .remove(&entity)
            .ok_or_else(|| Error::entity_not_found(entity))?;
        Ok(ids.iter().filter_map(|id| idx.by_id.remove(id)).collect())
    }

    /// Checks whether a component id is present.
    #[must_use]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.indices.read().by_id.contains_key(&id)
    }

    /// Returns the entities that hold at least one component here, ascending.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityId> {
        let mut entities: Vec<_> = self.indices.read().by_entity.keys().copied().collect();
        entities.sort_unstable();
        entities
    }

    /// Returns the number of components in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.read().by_id.len()
    }

    /// Returns true if the store holds no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.read().by_id.is_empty()
    }
}
