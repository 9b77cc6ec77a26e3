//! Rooted parent/child tree over entity ids.
//!
//! The tree is stored as two maps (child -> parent, parent -> ordered
//! children) rather than as linked nodes. It is not synchronized; owners
//! wrap it in their own lock.

use std::collections::{HashMap, HashSet};

use cinder_foundation::{EntityId, Error, ErrorKind, Result};

/// Parent/child hierarchy of entities rooted at a designated root.
///
/// Invariants:
/// - the root has no parent, every other member has exactly one
/// - no entity is its own ancestor
/// - each children list keeps insertion order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hierarchy {
    root: EntityId,
    parents: HashMap<EntityId, EntityId>,
    children: HashMap<EntityId, Vec<EntityId>>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new(EntityId::ROOT)
    }
}

impl Hierarchy {
    /// Creates a hierarchy containing only `root`.
    #[must_use]
    pub fn new(root: EntityId) -> Self {
        Self {
            root,
            parents: HashMap::new(),
            children: HashMap::new(),
        }
    }

    /// Rebuilds a hierarchy from unordered `(parent, child)` pairs.
    ///
    /// The tree is expanded from the root; each parent's children keep the
    /// order in which their pairs appear. Pairs whose parent is never reached
    /// from the root are skipped, as are repeated children (the first
    /// placement wins). The result is deterministic for a given pair order.
    pub fn build<I>(root: EntityId, pairs: I) -> Self
    where
        I: IntoIterator<Item = (EntityId, EntityId)>,
    {
        let mut pending: HashMap<EntityId, Vec<EntityId>> = HashMap::new();
        let mut total = 0usize;
        for (parent, child) in pairs {
            pending.entry(parent).or_default().push(child);
            total += 1;
        }

        let mut tree = Self::new(root);
        let mut placed: HashSet<EntityId> = HashSet::from([root]);
        let mut stack = vec![root];
        while let Some(parent) = stack.pop() {
            let Some(kids) = pending.remove(&parent) else {
                continue;
            };
            for child in kids {
                if placed.insert(child) {
                    tree.link(parent, child);
                    stack.push(child);
                }
            }
        }

        let skipped = total - tree.parents.len();
        if skipped > 0 {
            tracing::warn!(
                skipped,
                root = root.raw(),
                "hierarchy build skipped pairs not reachable from the root"
            );
        }
        tree
    }

    /// Returns the configured root.
    #[must_use]
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Checks whether an entity is part of the tree.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        entity == self.root || self.parents.contains_key(&entity)
    }

    /// Returns the number of members, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len() + 1
    }

    /// Returns true if the tree holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Attaches `child` under `parent`.
    ///
    /// # Errors
    ///
    /// - `ParentMissing` if `parent` is not in the tree
    /// - `AlreadyHasParent` if `child` is already attached
    /// - `Cyclic` if `parent` is reachable from `child`
    pub fn add(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        self.check_add(parent, child)?;
        self.link(parent, child);
        Ok(())
    }

    /// Validates [`Hierarchy::add`] without mutating.
    ///
    /// # Errors
    ///
    /// Returns the error `add` would return.
    pub fn check_add(&self, parent: EntityId, child: EntityId) -> Result<()> {
        if !self.contains(parent) {
            return Err(Error::new(ErrorKind::ParentMissing(parent)));
        }
        if self.parents.contains_key(&child) {
            return Err(Error::new(ErrorKind::AlreadyHasParent(child)));
        }
        if self.is_ancestor(child, parent) {
            return Err(Error::new(ErrorKind::Cyclic { parent, child }));
        }
        Ok(())
    }

    /// Moves `child` under `new_parent`, appending it to the new children list.
    ///
    /// A no-op if `new_parent` is already the parent. On error the tree is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - `NoParent` if `child` is the root
    /// - `EntityNotFound` if `child` is not in the tree
    /// - `ParentMissing` if `new_parent` is not in the tree
    /// - `Cyclic` if `child` is an ancestor of `new_parent`
    pub fn update(&mut self, new_parent: EntityId, child: EntityId) -> Result<()> {
        let old_parent = self.parent(child)?;
        if old_parent == new_parent {
            return Ok(());
        }
        if !self.contains(new_parent) {
            return Err(Error::new(ErrorKind::ParentMissing(new_parent)));
        }
        if self.is_ancestor(child, new_parent) {
            return Err(Error::new(ErrorKind::Cyclic {
                parent: new_parent,
                child,
            }));
        }

        self.detach(old_parent, child);
        self.link(new_parent, child);
        Ok(())
    }

    /// Removes the subtree rooted at `entity`.
    ///
    /// Returns the removed entities depth-first, subtree root first.
    ///
    /// # Errors
    ///
    /// - `RootProtected` if `entity` is the root
    /// - `EntityNotFound` if `entity` is not in the tree
    pub fn delete(&mut self, entity: EntityId) -> Result<Vec<EntityId>> {
        if entity == self.root {
            return Err(Error::new(ErrorKind::RootProtected(entity)));
        }
        let parent = self.parent(entity)?;

        let mut removed = vec![entity];
        removed.extend(self.descendants(entity));

        self.detach(parent, entity);
        for e in &removed {
            self.parents.remove(e);
            self.children.remove(e);
        }
        Ok(removed)
    }

    /// Returns the parent of `child`.
    ///
    /// # Errors
    ///
    /// - `NoParent` if `child` is the root
    /// - `EntityNotFound` if `child` is not in the tree
    pub fn parent(&self, child: EntityId) -> Result<EntityId> {
        if child == self.root {
            return Err(Error::new(ErrorKind::NoParent(child)));
        }
        self.parents
            .get(&child)
            .copied()
            .ok_or_else(|| Error::entity_not_found(child))
    }

    /// Returns the ordered children of `parent` (empty if none).
    #[must_use]
    pub fn children(&self, parent: EntityId) -> &[EntityId] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns every descendant of `entity` in depth-first pre-order,
    /// excluding `entity` itself.
    #[must_use]
    pub fn descendants(&self, entity: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack: Vec<EntityId> = self.children(entity).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Checks whether `ancestor` is `entity` or lies above it.
    ///
    /// Walks the subtree below `ancestor`, so the cost is proportional to
    /// that subtree's size.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: EntityId, entity: EntityId) -> bool {
        if ancestor == entity {
            return true;
        }
        let mut stack: Vec<EntityId> = self.children(ancestor).to_vec();
        while let Some(next) = stack.pop() {
            if next == entity {
                return true;
            }
            stack.extend_from_slice(self.children(next));
        }
        false
    }

    /// Returns every `(parent, child)` edge in depth-first pre-order from the
    /// root. Feeding the result to [`Hierarchy::build`] reproduces the tree.
    #[must_use]
    pub fn pairs(&self) -> Vec<(EntityId, EntityId)> {
        self.descendants(self.root)
            .into_iter()
            .filter_map(|child| self.parents.get(&child).map(|parent| (*parent, child)))
            .collect()
    }

    fn link(&mut self, parent: EntityId, child: EntityId) {
        self.parents.insert(child, parent);
        self.children.entry(parent).or_default().push(child);
    }

    fn detach(&mut self, parent: EntityId, child: EntityId) {
        if let Some(kids) = self.children.get_mut(&parent) {
            kids.retain(|k| *k != child);
            if kids.is_empty() {
                self.children.remove(&parent);
            }
        }
        self.parents.remove(&child);
    }
}
