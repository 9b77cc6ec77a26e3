//! Integration tests for component stores
//!
//! Tests id assignment, the entity index, and the uniqueness policy.

use cinder_foundation::{ComponentId, EntityId, ErrorKind, Lookup};
use cinder_storage::{Component, ComponentStore, EntityAllocator, Uniqueness};

#[derive(Clone, Debug, PartialEq)]
struct Marker {
    id: ComponentId,
    entity: EntityId,
    label: &'static str,
}

impl Marker {
    fn on(entity: u32, label: &'static str) -> Self {
        Self {
            id: ComponentId::UNASSIGNED,
            entity: EntityId::new(entity),
            label,
        }
    }
}

impl Component for Marker {
    const NAME: &'static str = "marker";

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

// =============================================================================
// Id Assignment
// =============================================================================

#[test]
fn ids_start_at_one_and_increase() {
    let store = ComponentStore::default();
    let a = store.add(Marker::on(1, "a")).unwrap();
    let b = store.add(Marker::on(1, "b")).unwrap();
    let c = store.add(Marker::on(2, "c")).unwrap();

    assert_eq!(a, ComponentId::new(1));
    assert_eq!(b, ComponentId::new(2));
    assert_eq!(c, ComponentId::new(3));
}

#[test]
fn stored_value_carries_its_id() {
    let store = ComponentStore::default();
    let id = store.add(Marker::on(4, "x")).unwrap();
    assert_eq!(store.get(id).unwrap().id, id);
}

#[test]
fn explicit_duplicate_id_is_rejected() {
    let store = ComponentStore::default();
    let mut first = Marker::on(1, "a");
    first.id = ComponentId::new(10);
    store.add(first.clone()).unwrap();

    let err = store.add(first).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateId(id) if id == ComponentId::new(10)));
    assert_eq!(store.len(), 1);
}

#[test]
fn add_then_delete_restores_prior_state() {
    let store = ComponentStore::default();
    store.add(Marker::on(1, "keep")).unwrap();
    let before = store.list();

    let id = store.add(Marker::on(1, "drop")).unwrap();
    store.delete(id).unwrap();

    assert_eq!(store.list(), before);
    assert_eq!(store.list_by_entity(EntityId::new(1)).len(), 1);
}

// =============================================================================
// Entity Index
// =============================================================================

#[test]
fn list_by_entity_keeps_insertion_order() {
    let store = ComponentStore::default();
    store.add(Marker::on(3, "first")).unwrap();
    store.add(Marker::on(9, "other")).unwrap();
    store.add(Marker::on(3, "second")).unwrap();

    let labels: Vec<_> = store
        .list_by_entity(EntityId::new(3))
        .into_iter()
        .map(|m| m.label)
        .collect();
    assert_eq!(labels, vec!["first", "second"]);
    assert_eq!(store.first(EntityId::new(3)).unwrap().label, "first");
}

#[test]
fn update_moves_component_between_entities() {
    let store = ComponentStore::default();
    let id = store.add(Marker::on(1, "roamer")).unwrap();
    store.add(Marker::on(2, "resident")).unwrap();

    let mut moved = store.get(id).unwrap();
    moved.entity = EntityId::new(2);
    let previous = store.update(moved).unwrap();

    assert_eq!(previous.entity, EntityId::new(1));
    assert!(store.list_by_entity(EntityId::new(1)).is_empty());
    let labels: Vec<_> = store
        .list_by_entity(EntityId::new(2))
        .into_iter()
        .map(|m| m.label)
        .collect();
    assert_eq!(labels, vec!["resident", "roamer"]);
}

#[test]
fn update_of_unchanged_value_is_noop() {
    let store = ComponentStore::default();
    let id = store.add(Marker::on(1, "a")).unwrap();
    let before = store.list();
    store.update(store.get(id).unwrap()).unwrap();
    assert_eq!(store.list(), before);
}

#[test]
fn delete_by_entity_removes_all() {
    let store = ComponentStore::default();
    store.add(Marker::on(5, "a")).unwrap();
    store.add(Marker::on(5, "b")).unwrap();
    store.add(Marker::on(6, "c")).unwrap();

    let removed = store.delete_by_entity(EntityId::new(5)).unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(store.entities(), vec![EntityId::new(6)]);

    let err = store.delete_by_entity(EntityId::new(5)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::EntityNotFound(_)));
}

#[test]
fn missing_id_is_not_found() {
    let store: ComponentStore<Marker> = ComponentStore::default();
    let err = store.get(ComponentId::new(3)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotFound(Lookup::Id(_))));
}

// =============================================================================
// Uniqueness
// =============================================================================

#[test]
fn unique_store_rejects_second_component() {
    let store = ComponentStore::unique();
    assert_eq!(store.uniqueness(), Uniqueness::PerEntity);

    let first = store.add(Marker::on(7, "one")).unwrap();
    let err = store.add(Marker::on(7, "two")).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::UniqueViolation(e) if e == EntityId::new(7)));
    assert_eq!(store.first(EntityId::new(7)).unwrap().id, first);
}

#[test]
fn unique_store_rejects_move_onto_occupied_entity() {
    let store = ComponentStore::new(Uniqueness::PerEntity);
    store.add(Marker::on(1, "a")).unwrap();
    let id = store.add(Marker::on(2, "b")).unwrap();

    let mut moved = store.get(id).unwrap();
    moved.entity = EntityId::new(1);
    let err = store.update(moved).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::UniqueViolation(_)));
    assert_eq!(store.get(id).unwrap().entity, EntityId::new(2));
}

// =============================================================================
// Entity Allocation
// =============================================================================

#[test]
fn allocator_skips_observed_ids() {
    let allocator = EntityAllocator::default();
    assert_eq!(allocator.allocate().unwrap(), EntityId::new(1));
    allocator.observe(EntityId::new(20));
    assert_eq!(allocator.allocate().unwrap(), EntityId::new(21));
    allocator.observe(EntityId::new(5));
    assert_eq!(allocator.high_water(), EntityId::new(21));
}
