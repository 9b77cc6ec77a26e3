//! Component stores, entity allocation, and the entity hierarchy for Cinder.
//!
//! This crate provides:
//! - [`ComponentStore`] - Per-variant store indexed by component id and by entity
//! - [`EntityAllocator`] - Monotonic entity id allocation
//! - [`Hierarchy`] - Rooted parent/child tree with cycle checks and cascade delete

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod entity;
pub mod hierarchy;

pub use component::{Component, ComponentStore, Uniqueness};
pub use entity::EntityAllocator;
pub use hierarchy::Hierarchy;
