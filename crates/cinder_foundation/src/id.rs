//! Entity and component identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque entity identifier.
///
/// Identifiers are handed out in increasing order and never reused within a
/// process. [`EntityId::ROOT`] (zero) is reserved for the hierarchy root.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl EntityId {
    /// The reserved root entity.
    pub const ROOT: Self = Self(0);

    /// Creates an entity ID from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns true if this is the reserved root value.
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity {}", self.0)
    }
}

/// Identifier of a component within a single store.
///
/// Ids are unique per component variant only; two variants may hold
/// components with the same numeric id. Zero means "not yet assigned".
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub u32);

impl ComponentId {
    /// The unassigned placeholder; stores replace it with the next free id.
    pub const UNASSIGNED: Self = Self(0);

    /// Creates a component ID from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns true if the id has not been assigned by a store yet.
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        self.0 == 0
    }

    /// Encodes the id as the four-byte big-endian key used by persistent buckets.
    #[must_use]
    pub const fn to_key(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Decodes a bucket key produced by [`ComponentId::to_key`].
    ///
    /// Returns `None` if the key is not exactly four bytes long.
    #[must_use]
    pub fn from_key(key: &[u8]) -> Option<Self> {
        let bytes: [u8; 4] = key.try_into().ok()?;
        Some(Self(u32::from_be_bytes(bytes)))
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
