//! Configuration system for the Wayfarer discovery client.
//!
//! Provides TOML-based configuration with file layering: the user config
//! (`~/.config/wayfarer/config.toml`, or `$WAYFARER_CONFIG_DIR/config.toml`)
//! is read first and a project-local `wayfarer.toml` overrides it section by
//! section.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    CONFIG_DIR_ENV, ConfigPaths, ConfigSource, Layer, LoadedConfig, load_config_file, storage_dir,
};
pub use error::{ConfigError, Result};
pub use types::*;
