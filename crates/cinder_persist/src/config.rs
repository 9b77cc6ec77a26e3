//! Configuration for the persistence lifecycle.

use cinder_world::ComponentKind;

/// Which variants are persisted, in load order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistConfig {
    /// Persistent variants. Load walks them in this order, so the anchor
    /// variant usually comes first.
    pub variants: Vec<ComponentKind>,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            variants: vec![
                ComponentKind::Position,
                ComponentKind::Controllable,
                ComponentKind::Skeleton,
            ],
        }
    }
}

impl PersistConfig {
    /// Persists every variant, including transient ones.
    #[must_use]
    pub fn all() -> Self {
        Self {
            variants: ComponentKind::ALL.to_vec(),
        }
    }

    /// Persists nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            variants: Vec::new(),
        }
    }

    /// Builder method to append a variant if it is not already listed.
    #[must_use]
    pub fn with_variant(mut self, kind: ComponentKind) -> Self {
        if !self.variants.contains(&kind) {
            self.variants.push(kind);
        }
        self
    }

    /// Returns true if the variant is persisted.
    #[must_use]
    pub fn persists(&self, kind: ComponentKind) -> bool {
        self.variants.contains(&kind)
    }
}
