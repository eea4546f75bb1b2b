// src/config/mod.rs

//! Configuration loading and validation for frontpipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate roots, ports, tool templates and durations (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    BrowserFloor, ConfigFile, CssSection, PathsSection, RawConfigFile, ReportSection,
    ServerSection, SpriteSection, ToolsSection, TunnelSection, parse_duration,
};
pub use validate::validate_config;
