//! Core identifiers and error types for Cinder.
//!
//! This crate provides:
//! - [`EntityId`] - Opaque entity identifiers (zero is the hierarchy root)
//! - [`ComponentId`] - Per-store component identifiers
//! - [`Error`] - Error kinds with operation context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod id;

pub use error::{Error, ErrorContext, ErrorKind, Lookup, Result};
pub use id::{ComponentId, EntityId};
