//! Persistence for Cinder components.
//!
//! This crate provides:
//! - [`KvStore`], [`Transaction`], [`Bucket`] - The key-value contract
//! - [`MemoryStore`] - An in-memory store with snapshot transactions
//! - [`Lifecycle`] - Buffers component events and commits them in batches
//! - [`codec`] - `MessagePack` encoding of component values
//!
//! Each persistent variant gets one bucket named by its tag. Keys are the
//! component id as four big-endian bytes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod codec;
pub mod config;
pub mod kv;
pub mod lifecycle;
pub mod memory;

pub use config::PersistConfig;
pub use kv::{Bucket, KvStore, Transaction};
pub use lifecycle::Lifecycle;
pub use memory::MemoryStore;
