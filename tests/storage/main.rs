//! Integration tests for Layer 1: Storage
//!
//! Tests for component stores, entity allocation, and the entity hierarchy.

mod components;
