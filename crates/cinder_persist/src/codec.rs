//! Component encoding using `MessagePack`.
//!
//! Values are written with named fields so the encoding is self-describing
//! and survives field reordering.

use serde::Serialize;
use serde::de::DeserializeOwned;

use cinder_foundation::{Error, Result};
use cinder_world::AnyComponent;

/// Serializes a value to `MessagePack` bytes.
///
/// # Errors
///
/// Returns `Encode` if serialization fails.
pub fn encode<V: Serialize>(value: &V) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(value).map_err(Error::encode)
}

/// Deserializes a value from `MessagePack` bytes.
///
/// # Errors
///
/// Returns `Decode` if the bytes do not hold a `V`.
pub fn decode<V: DeserializeOwned>(bytes: &[u8]) -> Result<V> {
    rmp_serde::from_slice(bytes).map_err(Error::decode)
}

/// Serializes the concrete value inside a component snapshot.
///
/// # Errors
///
/// Returns `Encode` if serialization fails.
pub fn encode_any(component: &AnyComponent) -> Result<Vec<u8>> {
    match component {
        AnyComponent::Position(c) => encode(c),
        AnyComponent::Controllable(c) => encode(c),
        AnyComponent::Skeleton(c) => encode(c),
        AnyComponent::Velocity(c) => encode(c),
    }
}
