// src/config/mod.rs

//! Configuration loading and validation for mpbuild.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and normalize the roots (`loader.rs`).
//! - Validate basic invariants before any task runs (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, normalize_path};
pub use model::{CategorySection, ConfigFile, NpmSection, OneOrMany, ProjectSection, StyleSection};
pub use validate::validate_config;
