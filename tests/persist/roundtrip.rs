//! Save and load round trips

use cinder_foundation::{ComponentId, EntityId, ErrorKind};
use cinder_persist::{Lifecycle, MemoryStore, PersistConfig};
use cinder_world::{Controllable, Position, Skeleton, Velocity, World};

fn e(raw: u32) -> EntityId {
    EntityId::new(raw)
}

#[allow(clippy::cast_precision_loss)]
fn spot(i: u32) -> Position {
    Position::new(10.0 * i as f32, 10.0 * i as f32)
}

fn populate(world: &World, count: u32) {
    for i in 1..=count {
        let entity = world.create_entity(e(0), spot(i)).unwrap();
        assert_eq!(entity, e(i));
    }
}

fn reload_tracked(store: &MemoryStore) -> (World, Lifecycle) {
    let fresh = World::new();
    let lifecycle = Lifecycle::attach(&fresh, PersistConfig::default());
    lifecycle.load_from(&fresh, store).unwrap();
    assert!(!lifecycle.is_dirty());
    (fresh, lifecycle)
}

fn reload(store: &MemoryStore) -> World {
    reload_tracked(store).0
}

#[test]
fn persistence_round_trip() {
    let world = World::new();
    let lifecycle = Lifecycle::attach(&world, PersistConfig::default());
    populate(&world, 100);
    for i in 1..=100 {
        world.add(Controllable::on(e(i))).unwrap();
        world.add(Skeleton::on(e(i), "knight")).unwrap();
    }

    let store = MemoryStore::new();
    assert_eq!(lifecycle.save(&store).unwrap(), 300);
    assert!(!lifecycle.is_dirty());

    let fresh = reload(&store);
    for i in 1..=100 {
        assert_eq!(
            fresh.get::<Position>(e(i)).unwrap(),
            world.get::<Position>(e(i)).unwrap()
        );
        assert!(fresh.get::<Controllable>(e(i)).is_ok());
        assert!(fresh.get::<Skeleton>(e(i)).is_ok());
    }
    assert_eq!(fresh.children(e(0)).len(), 100);
}

#[test]
fn persistence_with_mid_session_delete() {
    let world = World::new();
    let lifecycle = Lifecycle::attach(&world, PersistConfig::default());
    populate(&world, 100);

    let doomed = world.get::<Position>(e(50)).unwrap();
    world.delete(&doomed).unwrap();

    let store = MemoryStore::new();
    lifecycle.save(&store).unwrap();
    assert_eq!(store.bucket_len("position"), 99);

    let fresh = reload(&store);
    let err = fresh.get::<Position>(e(50)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotFound(_)));
    for i in (1..=100).filter(|i| *i != 50) {
        assert_eq!(
            fresh.get::<Position>(e(i)).unwrap(),
            world.get::<Position>(e(i)).unwrap()
        );
    }
}

#[test]
fn delete_after_save_removes_key() {
    let world = World::new();
    let lifecycle = Lifecycle::attach(&world, PersistConfig::default());
    populate(&world, 3);

    let store = MemoryStore::new();
    lifecycle.save(&store).unwrap();

    let gone = world.get::<Position>(e(2)).unwrap();
    world.delete(&gone).unwrap();
    assert_eq!(lifecycle.save(&store).unwrap(), 1);
    assert_eq!(store.bucket_len("position"), 2);
}

#[test]
fn reparented_tree_loads_whole() {
    let world = World::new();
    let lifecycle = Lifecycle::attach(&world, PersistConfig::default());
    populate(&world, 3);

    // Move 1 under 3 so a parent's id is higher than its child's.
    let mut anchor = world.get::<Position>(e(1)).unwrap();
    anchor.parent = e(3);
    world.update(anchor).unwrap();

    let store = MemoryStore::new();
    lifecycle.save(&store).unwrap();

    let fresh = reload(&store);
    assert_eq!(fresh.parent(e(1)).unwrap(), e(3));
    assert_eq!(fresh.children(e(3)), vec![e(1)]);
    assert_eq!(fresh.children(e(0)), vec![e(2), e(3)]);
}

#[test]
fn loaded_world_keeps_allocating_fresh_ids() {
    let world = World::new();
    let lifecycle = Lifecycle::attach(&world, PersistConfig::default());
    populate(&world, 5);
    let store = MemoryStore::new();
    lifecycle.save(&store).unwrap();

    let fresh = reload(&store);
    let next = fresh.create_entity(e(0), spot(6)).unwrap();
    assert_eq!(next, e(6));
}

#[test]
fn transient_variants_are_not_saved() {
    let world = World::new();
    let lifecycle = Lifecycle::attach(&world, PersistConfig::default());
    populate(&world, 1);
    world.add(Velocity::on(e(1), 2.0, 0.0)).unwrap();

    let store = MemoryStore::new();
    lifecycle.save(&store).unwrap();

    assert_eq!(store.bucket_len("velocity"), 0);
    let fresh = reload(&store);
    assert!(fresh.list::<Velocity>().is_empty());
}

#[test]
fn load_republishes_created_events() {
    let world = World::new();
    let lifecycle = Lifecycle::attach(&world, PersistConfig::default());
    populate(&world, 4);
    let store = MemoryStore::new();
    lifecycle.save(&store).unwrap();

    let fresh = World::new();
    let created = std::sync::Arc::new(parking_lot::Mutex::new(0usize));
    let sink = std::sync::Arc::clone(&created);
    fresh.subscribe(
        |event: &cinder_world::ComponentEvent| !event.is_deleted(),
        move |_: &cinder_world::ComponentEvent| {
            *sink.lock() += 1;
            Ok(())
        },
    );
    let loader = Lifecycle::attach(&fresh, PersistConfig::default());
    assert_eq!(loader.load_from(&fresh, &store).unwrap(), 4);
    assert_eq!(*created.lock(), 4);
}

// =============================================================================
// Mutating a loaded world
// =============================================================================

#[test]
fn add_after_load_and_delete_gets_unused_id() {
    let world = World::new();
    let lifecycle = Lifecycle::attach(&world, PersistConfig::default());
    for i in 1..=3 {
        world.add(Skeleton::on(e(i), "zombie")).unwrap();
    }
    let store = MemoryStore::new();
    lifecycle.save(&store).unwrap();

    let (loaded, tracker) = reload_tracked(&store);
    let doomed = loaded.get_by_id::<Skeleton>(ComponentId::new(2)).unwrap();
    loaded.delete(&doomed).unwrap();
    let id = loaded.add(Skeleton::on(e(9), "ghoul")).unwrap();
    assert_eq!(id, ComponentId::new(4));
    assert_eq!(tracker.save(&store).unwrap(), 2);

    let again = reload(&store);
    assert_eq!(again.get::<Skeleton>(e(9)).unwrap().id, id);
    assert!(again.get::<Skeleton>(e(2)).is_err());
    assert!(again.get_by_id::<Skeleton>(ComponentId::new(2)).is_err());
    assert_eq!(again.list::<Skeleton>().len(), 3);
}

#[test]
fn loaded_world_mutates_saves_and_reloads() {
    let world = World::new();
    let lifecycle = Lifecycle::attach(&world, PersistConfig::default());
    populate(&world, 5);
    for i in 1..=5 {
        world.add(Skeleton::on(e(i), "knight")).unwrap();
    }
    let store = MemoryStore::new();
    lifecycle.save(&store).unwrap();

    let (loaded, tracker) = reload_tracked(&store);
    let child = loaded.create_entity(e(2), spot(6)).unwrap();
    assert_eq!(child, e(6));
    let mut moved = loaded.get::<Position>(e(1)).unwrap();
    moved.x = 99.0;
    loaded.update(moved).unwrap();
    loaded.destroy_entity(e(3)).unwrap();
    let skeleton = loaded.get::<Skeleton>(e(4)).unwrap();
    loaded.delete(&skeleton).unwrap();
    loaded.add(Controllable::on(e(5))).unwrap();
    loaded.add(Skeleton::on(child, "squire")).unwrap();
    assert!(tracker.is_dirty());
    tracker.save(&store).unwrap();
    assert!(!tracker.is_dirty());

    let again = reload(&store);
    assert_eq!(again.list::<Position>(), loaded.list::<Position>());
    assert_eq!(again.list::<Skeleton>(), loaded.list::<Skeleton>());
    assert_eq!(again.list::<Controllable>(), loaded.list::<Controllable>());
    assert_eq!(again.children(e(0)), vec![e(1), e(2), e(4), e(5)]);
    assert_eq!(again.children(e(2)), vec![child]);
    assert_eq!(again.get::<Position>(e(1)).unwrap().x, 99.0);
    assert!(again.get::<Position>(e(3)).is_err());
}
