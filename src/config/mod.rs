// src/config/mod.rs

//! Configuration loading and validation for carrierlab.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like non-zero task counts and pool sizes
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{HarnessConfig, HarnessSection, PoolSection, RawHarnessConfig, WaitSection};
