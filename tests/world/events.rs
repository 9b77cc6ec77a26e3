//! Event delivery through the ECS facade

use std::sync::Arc;

use cinder_bus::AnyOf;
use cinder_foundation::{EntityId, Error, ErrorKind};
use cinder_world::{
    Action, ComponentEvent, ComponentKind, KindMatcher, Position, Skeleton, TagMatcher, World,
};
use parking_lot::Mutex;

fn e(raw: u32) -> EntityId {
    EntityId::new(raw)
}

fn tags(world: &World, matcher: TagMatcher) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    world.subscribe(matcher, move |event: &ComponentEvent| {
        sink.lock().push(event.tag().to_owned());
        Ok(())
    });
    log
}

#[test]
fn one_event_per_mutation() {
    let world = World::new();
    let log = tags(
        &world,
        TagMatcher::of(ComponentKind::Skeleton, &Action::ALL),
    );

    world.add(Skeleton::on(e(1), "imp")).unwrap();
    let mut skeleton = world.get::<Skeleton>(e(1)).unwrap();
    skeleton.frame = 2;
    world.update(skeleton.clone()).unwrap();
    world.delete(&skeleton).unwrap();

    assert_eq!(
        *log.lock(),
        vec!["skeleton.created", "skeleton.updated", "skeleton.deleted"]
    );
}

#[test]
fn failed_mutation_publishes_nothing() {
    let world = World::new();
    let log = tags(
        &world,
        TagMatcher::of(ComponentKind::Position, &Action::ALL),
    );

    let err = world
        .create_entity(e(77), Position::new(0.0, 0.0))
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::ParentMissing(_)));
    assert!(log.lock().is_empty());
}

#[test]
fn subscribe_unsubscribe_then_publish_delivers_nothing() {
    let world = World::new();
    let hits = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&hits);
    let id = world.subscribe(KindMatcher::new(ComponentKind::ALL), move |_: &ComponentEvent| {
        *sink.lock() += 1;
        Ok(())
    });

    world.unsubscribe(id);
    world.add(Skeleton::on(e(1), "bat")).unwrap();

    assert_eq!(*hits.lock(), 0);
}

#[test]
fn matchers_filter_by_variant() {
    let world = World::new();
    let positions = tags(
        &world,
        TagMatcher::of(ComponentKind::Position, &[Action::Created]),
    );

    world.create_entity(e(0), Position::new(0.0, 0.0)).unwrap();
    world.add(Skeleton::on(e(1), "bat")).unwrap();

    assert_eq!(*positions.lock(), vec!["position.created"]);
}

#[test]
fn any_of_combines_matchers() {
    let world = World::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let matcher = AnyOf::new()
        .or(TagMatcher::of(ComponentKind::Skeleton, &[Action::Deleted]))
        .or(KindMatcher::new([ComponentKind::Position]));
    world.subscribe(matcher, move |event: &ComponentEvent| {
        sink.lock().push(event.tag().to_owned());
        Ok(())
    });

    world.create_entity(e(0), Position::new(0.0, 0.0)).unwrap();
    world.add(Skeleton::on(e(1), "bat")).unwrap();
    let skeleton = world.get::<Skeleton>(e(1)).unwrap();
    world.delete(&skeleton).unwrap();

    assert_eq!(*log.lock(), vec!["position.created", "skeleton.deleted"]);
}

#[test]
fn handlers_run_in_subscription_order() {
    let world = World::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for n in 0..3 {
        let sink = Arc::clone(&order);
        world.subscribe(KindMatcher::new([ComponentKind::Skeleton]), move |_: &ComponentEvent| {
            sink.lock().push(n);
            Ok(())
        });
    }

    world.add(Skeleton::on(e(1), "bat")).unwrap();
    assert_eq!(*order.lock(), vec![0, 1, 2]);
}

#[test]
fn handler_error_stops_later_handlers_but_keeps_mutation() {
    let world = World::new();
    let reached = Arc::new(Mutex::new(false));

    world.subscribe(KindMatcher::new([ComponentKind::Skeleton]), |_: &ComponentEvent| {
        Err(Error::storage("backend offline"))
    });
    let sink = Arc::clone(&reached);
    world.subscribe(KindMatcher::new([ComponentKind::Skeleton]), move |_: &ComponentEvent| {
        *sink.lock() = true;
        Ok(())
    });

    let err = world.add(Skeleton::on(e(1), "bat")).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Storage(_)));
    assert!(!*reached.lock());
    assert!(world.get::<Skeleton>(e(1)).is_ok());
}

#[test]
fn event_carries_typed_snapshot() {
    let world = World::new();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    world.subscribe(KindMatcher::new([ComponentKind::Position]), move |event: &ComponentEvent| {
        let position = event.component_as::<Position>()?;
        *sink.lock() = Some((position.x, position.y, position.parent));
        Ok(())
    });

    world.create_entity(e(0), Position::new(3.0, 4.0)).unwrap();
    assert_eq!(*seen.lock(), Some((3.0, 4.0, e(0))));
}

#[test]
fn cascade_delivers_every_deleted_event_when_a_handler_fails() {
    let world = World::new();
    let a = world.create_entity(e(0), Position::new(0.0, 0.0)).unwrap();
    let b = world.create_entity(a, Position::new(0.0, 0.0)).unwrap();
    let c = world.create_entity(b, Position::new(0.0, 0.0)).unwrap();

    let before = tags(
        &world,
        TagMatcher::of(ComponentKind::Position, &[Action::Deleted]),
    );
    world.subscribe(KindMatcher::new([ComponentKind::Position]), move |event: &ComponentEvent| {
        if event.entity() == a {
            Err(Error::storage("index offline"))
        } else {
            Ok(())
        }
    });
    let after = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&after);
    world.subscribe(KindMatcher::new([ComponentKind::Position]), move |event: &ComponentEvent| {
        sink.lock().push(event.entity());
        Ok(())
    });

    let anchor = world.get::<Position>(a).unwrap();
    let err = world.delete(&anchor).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Storage(_)));
    assert_eq!(err.context.unwrap().operation, Some("delete"));
    assert_eq!(before.lock().len(), 3);
    assert_eq!(*after.lock(), vec![b, c]);
    assert!(world.list::<Position>().is_empty());
    assert!(world.children(e(0)).is_empty());
}
