//! Matcher-filtered publish/subscribe event bus for Cinder.
//!
//! This crate provides:
//! - [`EventBus`] - Thread-safe bus with snapshot-then-dispatch publishing
//! - [`Matcher`] - Predicate deciding which events a subscription receives
//! - [`Always`], [`AnyOf`] - Matcher combinators

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bus;
pub mod matcher;

pub use bus::{EventBus, Handler, Subscription, SubscriptionId};
pub use matcher::{Always, AnyOf, Matcher};
