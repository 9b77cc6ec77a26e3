//! Cinder - Entity-component core
//!
//! This crate re-exports all layers of the Cinder system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: cinder_persist    - Event buffering, KV transactions, load
//! Layer 2: cinder_world      - Variants, events, the World facade
//! Layer 1: cinder_storage    - Component stores, allocation, hierarchy
//!          cinder_bus        - Matcher-filtered publish/subscribe
//! Layer 0: cinder_foundation - Core types (EntityId, ComponentId, Error)
//! ```

pub use cinder_bus as bus;
pub use cinder_foundation as foundation;
pub use cinder_persist as persist;
pub use cinder_storage as storage;
pub use cinder_world as world;
