//! The ECS facade.
//!
//! The `World` owns one [`ComponentStore`] per variant, the entity
//! [`Hierarchy`], the [`EntityAllocator`], and the [`EventBus`]. Every
//! successful mutation publishes exactly one event per changed component,
//! after the stores have been updated and before the call returns. No lock
//! is held while handlers run.
//!
//! Lock order is hierarchy, then store.

use parking_lot::RwLock;

use cinder_bus::{EventBus, Matcher, SubscriptionId};
use cinder_foundation::{ComponentId, EntityId, Error, ErrorKind, Result};
use cinder_storage::{Component, ComponentStore, EntityAllocator, Hierarchy};

use crate::components::{Controllable, Position, Skeleton, Velocity};
use crate::config::WorldConfig;
use crate::event::{Action, ComponentEvent};
use crate::variant::{AnyComponent, Variant};
use crate::view::StoreView;

fn store_for<V: Variant>() -> ComponentStore<V> {
    if V::UNIQUE {
        ComponentStore::unique()
    } else {
        ComponentStore::default()
    }
}

/// Stores, hierarchy, and event bus behind one API.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    pub(crate) positions: ComponentStore<Position>,
    pub(crate) controllables: ComponentStore<Controllable>,
    pub(crate) skeletons: ComponentStore<Skeleton>,
    pub(crate) velocities: ComponentStore<Velocity>,
    hierarchy: RwLock<Hierarchy>,
    allocator: EntityAllocator,
    bus: EventBus<ComponentEvent>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world rooted at [`EntityId::ROOT`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates an empty world with the given configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            positions: store_for(),
            controllables: store_for(),
            skeletons: store_for(),
            velocities: store_for(),
            hierarchy: RwLock::new(Hierarchy::new(config.root)),
            allocator: EntityAllocator::new(config.root),
            bus: EventBus::new(),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Returns the hierarchy root.
    #[must_use]
    pub fn root(&self) -> EntityId {
        self.config.root
    }

    /// Returns the event bus.
    #[must_use]
    pub fn bus(&self) -> &EventBus<ComponentEvent> {
        &self.bus
    }

    /// Subscribes to component events.
    pub fn subscribe<M, H>(&self, matcher: M, handler: H) -> SubscriptionId
    where
        M: Matcher<ComponentEvent> + 'static,
        H: Fn(&ComponentEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.bus.subscribe(matcher, handler)
    }

    /// Removes a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.bus.unsubscribe(id);
    }

    /// Returns a read-only view of a variant's store.
    #[must_use]
    pub fn store<V: Variant>(&self) -> StoreView<'_, V> {
        StoreView::new(V::store(self))
    }

    /// Returns the highest entity id allocated or observed.
    #[must_use]
    pub fn high_water(&self) -> EntityId {
        self.allocator.high_water()
    }

    // --- Mutators ---

    /// Adds a component and publishes `<variant>.created`.
    ///
    /// For the anchor variant the entity is attached under the component's
    /// parent in the hierarchy.
    ///
    /// # Errors
    ///
    /// Store errors (`DuplicateId`, `UniqueViolation`), hierarchy errors for
    /// anchors (`ParentMissing`, `AlreadyHasParent`, `Cyclic`), or the first
    /// handler error. A handler error is returned after the add committed.
    pub fn add<V: Variant>(&self, value: V) -> Result<ComponentId> {
        let ctx = |e: Error| e.during("add", V::NAME);
        let entity = value.entity();
        let mut snapshot = value.clone();

        let id = if V::ANCHOR {
            let parent = value.parent().unwrap_or(self.config.root);
            let mut tree = self.hierarchy.write();
            tree.check_add(parent, entity).map_err(ctx)?;
            let id = V::store(self).add(value).map_err(ctx)?;
            tree.add(parent, entity).map_err(ctx)?;
            id
        } else {
            V::store(self).add(value).map_err(ctx)?
        };

        snapshot.set_id(id);
        self.allocator.observe(entity);
        self.emit(Action::Created, snapshot.into(), "add")?;
        Ok(id)
    }

    /// Replaces a component and publishes `<variant>.updated`.
    ///
    /// For the anchor variant a changed parent reparents the entity.
    ///
    /// # Errors
    ///
    /// `NotFound`, `UniqueViolation`, `AnchorMoved` if an anchor's entity
    /// changed, hierarchy errors on reparent, or the first handler error.
    pub fn update<V: Variant>(&self, value: V) -> Result<()> {
        let id = value.id();
        let ctx = move |e: Error| e.during("update", V::NAME).for_component(id);
        let snapshot = value.clone();

        if V::ANCHOR {
            let mut tree = self.hierarchy.write();
            let current = V::store(self).get(id).map_err(ctx)?;
            let entity = current.entity();
            if value.entity() != entity {
                return Err(ctx(Error::new(ErrorKind::AnchorMoved {
                    from: entity,
                    to: value.entity(),
                })));
            }

            let old_parent = current.parent().unwrap_or(self.config.root);
            let new_parent = value.parent().unwrap_or(self.config.root);
            let reparent = old_parent != new_parent;
            if reparent {
                tree.update(new_parent, entity).map_err(ctx)?;
            }
            if let Err(err) = V::store(self).update(value) {
                if reparent {
                    if let Err(revert) = tree.update(old_parent, entity) {
                        tracing::error!(%entity, error = %revert, "could not revert reparent");
                    }
                }
                return Err(ctx(err));
            }
        } else {
            V::store(self).update(value).map_err(ctx)?;
        }

        self.emit(Action::Updated, snapshot.into(), "update")
    }

    /// Deletes a component and publishes `<variant>.deleted`.
    ///
    /// Deleting an anchor removes its entity's subtree from the hierarchy
    /// and deletes each descendant's anchor too, publishing one deleted
    /// event per removed anchor, depth-first with the subtree root first.
    ///
    /// Returns the removed value as it was stored.
    ///
    /// # Errors
    ///
    /// `NotFound`, `RootProtected` for an anchor on the root, or the first
    /// handler error. Every removed anchor's event is still published when a
    /// handler fails.
    pub fn delete<V: Variant>(&self, value: &V) -> Result<V> {
        let id = value.id();
        let ctx = move |e: Error| e.during("delete", V::NAME).for_component(id);

        if !V::ANCHOR {
            let removed = V::store(self).delete(id).map_err(ctx)?;
            self.emit(Action::Deleted, removed.clone().into(), "delete")?;
            return Ok(removed);
        }

        let (removed, cascade, _) = self.delete_anchor::<V>(id).map_err(ctx)?;
        let events = std::iter::once(removed.clone())
            .chain(cascade)
            .map(Into::into);
        self.emit_all(Action::Deleted, events, "delete")?;
        Ok(removed)
    }

    /// Allocates a new entity under `parent` and gives it `anchor` as its
    /// position. The anchor's id, entity, and parent fields are overwritten.
    ///
    /// # Errors
    ///
    /// `ParentMissing` if `parent` is not in the hierarchy, or any error from
    /// [`World::add`]. The allocated id is not reused after a failure.
    pub fn create_entity(&self, parent: EntityId, anchor: Position) -> Result<EntityId> {
        let entity = self
            .allocator
            .allocate()
            .map_err(|e| e.during("create_entity", Position::NAME))?;
        let anchor = Position {
            id: ComponentId::UNASSIGNED,
            entity,
            parent,
            ..anchor
        };
        self.add(anchor)
            .map_err(|e| e.during("create_entity", Position::NAME))?;
        Ok(entity)
    }

    /// Removes an entity, its subtree, and every component they hold.
    ///
    /// Returns the removed entities, subtree root first.
    ///
    /// # Errors
    ///
    /// `RootProtected` for the root, `EntityNotFound` if nothing held the
    /// entity, or the first handler error. Every removed component's event
    /// is still published when a handler fails.
    pub fn destroy_entity(&self, entity: EntityId) -> Result<Vec<EntityId>> {
        let ctx = |e: Error| e.during("destroy_entity", "entity");
        if entity == self.config.root {
            return Err(ctx(Error::new(ErrorKind::RootProtected(entity))));
        }

        let mut removed_components: Vec<AnyComponent> = Vec::new();
        let removed = match self.positions.first(entity) {
            Ok(anchor) => {
                let (anchor, cascade, subtree) =
                    self.delete_anchor::<Position>(anchor.id).map_err(ctx)?;
                removed_components.push(anchor.into());
                removed_components.extend(cascade.into_iter().map(Into::into));
                subtree
            }
            Err(_) => vec![entity],
        };

        for e in &removed {
            self.purge::<Controllable>(*e, &mut removed_components);
            self.purge::<Skeleton>(*e, &mut removed_components);
            self.purge::<Velocity>(*e, &mut removed_components);
        }
        if removed_components.is_empty() {
            return Err(ctx(Error::entity_not_found(entity)));
        }

        tracing::debug!(
            %entity,
            entities = removed.len(),
            components = removed_components.len(),
            "destroyed entity"
        );
        self.emit_all(Action::Deleted, removed_components, "destroy_entity")?;
        Ok(removed)
    }

    /// Reinstalls components read back from storage and publishes a created
    /// event for each.
    ///
    /// Explicit ids are kept. For the anchor variant the hierarchy is rebuilt
    /// from the existing edges plus each item's `(parent, entity)` pair, so
    /// items may arrive in any order; pairs not reachable from the root are
    /// left out of the tree.
    ///
    /// # Errors
    ///
    /// Store errors or the first handler error. On error the world may hold
    /// part of `items` and should be discarded.
    pub fn restore<V: Variant>(&self, items: Vec<V>) -> Result<()> {
        let ctx = |e: Error| e.during("restore", V::NAME);
        let store = V::store(self);
        let mut restored = Vec::with_capacity(items.len());

        if V::ANCHOR {
            let mut tree = self.hierarchy.write();
            let mut pairs = tree.pairs();
            for mut item in items {
                let id = store.add(item.clone()).map_err(ctx)?;
                item.set_id(id);
                pairs.push((item.parent().unwrap_or(self.config.root), item.entity()));
                restored.push(item);
            }
            *tree = Hierarchy::build(self.config.root, pairs);
        } else {
            for mut item in items {
                let id = store.add(item.clone()).map_err(ctx)?;
                item.set_id(id);
                restored.push(item);
            }
        }

        for item in &restored {
            self.allocator.observe(item.entity());
        }
        tracing::debug!(variant = V::NAME, count = restored.len(), "restored components");
        for item in restored {
            self.emit(Action::Created, item.into(), "restore")?;
        }
        Ok(())
    }

    // --- Queries ---

    /// Returns the first component of a variant attached to an entity.
    ///
    /// # Errors
    ///
    /// `NotFound` if the entity has none.
    pub fn get<V: Variant>(&self, entity: EntityId) -> Result<V> {
        V::store(self)
            .first(entity)
            .map_err(|_| Error::not_found_for(entity).during("get", V::NAME))
    }

    /// Returns a component by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is absent.
    pub fn get_by_id<V: Variant>(&self, id: ComponentId) -> Result<V> {
        V::store(self)
            .get(id)
            .map_err(|e| e.during("get_by_id", V::NAME))
    }

    /// Returns every component of a variant, ordered by id.
    #[must_use]
    pub fn list<V: Variant>(&self) -> Vec<V> {
        V::store(self).list()
    }

    /// Returns every component of a variant on an entity, in insertion order.
    #[must_use]
    pub fn list_by_entity<V: Variant>(&self, entity: EntityId) -> Vec<V> {
        V::store(self).list_by_entity(entity)
    }

    /// Returns the ordered children of an entity.
    #[must_use]
    pub fn children(&self, parent: EntityId) -> Vec<EntityId> {
        self.hierarchy.read().children(parent).to_vec()
    }

    /// Returns the parent of an entity.
    ///
    /// # Errors
    ///
    /// `NoParent` for the root, `EntityNotFound` if not in the hierarchy.
    pub fn parent(&self, child: EntityId) -> Result<EntityId> {
        self.hierarchy.read().parent(child)
    }

    /// Returns a copy of the hierarchy.
    #[must_use]
    pub fn hierarchy(&self) -> Hierarchy {
        self.hierarchy.read().clone()
    }

    // --- Private helpers ---

    /// Removes an anchor and its entity's subtree.
    ///
    /// Returns the anchor, the descendants' anchors in depth-first order, and
    /// the removed entities.
    fn delete_anchor<V: Variant>(&self, id: ComponentId) -> Result<(V, Vec<V>, Vec<EntityId>)> {
        let store = V::store(self);
        let mut tree = self.hierarchy.write();

        let entity = store.get(id)?.entity();
        if entity == tree.root() {
            return Err(Error::new(ErrorKind::RootProtected(entity)));
        }
        let removed = store.delete(id)?;
        let subtree = if tree.contains(entity) {
            tree.delete(entity)?
        } else {
            vec![entity]
        };

        let mut cascade = Vec::new();
        for descendant in &subtree[1..] {
            if let Ok(anchors) = store.delete_by_entity(*descendant) {
                cascade.extend(anchors);
            }
        }
        if !cascade.is_empty() {
            tracing::debug!(%entity, descendants = cascade.len(), "anchor cascade");
        }
        Ok((removed, cascade, subtree))
    }

    fn purge<V: Variant>(&self, entity: EntityId, out: &mut Vec<AnyComponent>) {
        if let Ok(removed) = V::store(self).delete_by_entity(entity) {
            out.extend(removed.into_iter().map(Into::into));
        }
    }

    fn emit(&self, action: Action, component: AnyComponent, operation: &'static str) -> Result<()> {
        let event = ComponentEvent::new(action, component);
        if self.config.trace_events {
            tracing::trace!(
                tag = event.tag(),
                id = %event.id(),
                entity = %event.entity(),
                "publish"
            );
        }
        self.bus.publish(&event).map_err(|err| {
            tracing::warn!(tag = event.tag(), error = %err, "event handler failed after commit");
            err.during(operation, event.kind().tag())
        })
    }

    /// Publishes one event per component, in order.
    ///
    /// The components are already gone from the stores, so a handler failure
    /// does not stop later events. The first error is returned.
    fn emit_all(
        &self,
        action: Action,
        components: impl IntoIterator<Item = AnyComponent>,
        operation: &'static str,
    ) -> Result<()> {
        let mut first = None;
        for component in components {
            if let Err(err) = self.emit(action, component, operation) {
                first.get_or_insert(err);
            }
        }
        first.map_or(Ok(()), Err)
    }
}
