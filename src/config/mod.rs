//! Configuration model for lessonbook.
//!
//! This module defines the Config struct that represents `lessonbook.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for every field, and validation of config values.

mod model;
mod operations;
pub mod types;


pub use model::Config;
pub use types::{CatalogSettings, EvalSettings, SandboxSettings};

/// Config file name looked up at the project root.
pub const CONFIG_FILE: &str = "lessonbook.yaml";
