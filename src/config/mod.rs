// src/config/mod.rs

//! Cluster file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a cluster file from disk, expanding `%{var}` references from its
//!   `[env]` table (`loader.rs`).
//! - Validate basic invariants like node naming and policy bounds
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{ClusterFile, ClusterSection, NodeConfig, RawClusterFile, UplinkConfig};
