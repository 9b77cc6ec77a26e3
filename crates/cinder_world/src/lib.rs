//! Component variants, events, and the ECS facade for Cinder.
//!
//! This crate provides:
//! - [`World`] - Owns one store per variant, the hierarchy, and the event bus
//! - [`StoreView`] - Read-only access to one variant's store
//! - [`Variant`] - Ties a component type to its store and event arm
//! - [`ComponentEvent`] - `<variant>.created|updated|deleted` events
//! - Concrete variants: [`Position`] (hierarchy anchor), [`Controllable`],
//!   [`Skeleton`], [`Velocity`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod components;
pub mod config;
pub mod event;
pub mod variant;
pub mod view;
pub mod world;

pub use components::{Controllable, Position, Skeleton, Velocity};
pub use config::WorldConfig;
pub use event::{Action, ComponentEvent, KindMatcher, TagMatcher};
pub use variant::{AnyComponent, ComponentKind, Variant};
pub use view::StoreView;
pub use world::World;
