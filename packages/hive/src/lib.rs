//! Hive: a registry of observable state containers with hooks and a
//! REST-backed data layer.
//!
//! This crate re-exports [`hive_core`] (containers, registry, hooks) and
//! [`hive_pollen`] (the HTTP client) under one name.

pub use hive_core::*;

pub mod pollen {
    pub use hive_pollen::*;
}

pub use hive_pollen::{ApiErrorKind, ApiException, Pollen, PollenConfig};
