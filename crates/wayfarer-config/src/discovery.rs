//! Where wayfarer reads its configuration and keeps its files.
//!
//! Two TOML layers are merged section by section, the later one winning:
//!
//! 1. `config.toml` in the config directory (`$WAYFARER_CONFIG_DIR`, else
//!    the platform config directory joined with `wayfarer`)
//! 2. `wayfarer.toml` in the project directory
//!
//! CLI flags are applied on top by the binary. Rolling logs live next to the
//! user config; saved sessions default to the platform data directory.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{ConfigError, Result, WayfarerConfig};

/// Environment variable that relocates the config directory.
pub const CONFIG_DIR_ENV: &str = "WAYFARER_CONFIG_DIR";

const APP_DIR: &str = "wayfarer";
const USER_FILE: &str = "config.toml";
const PROJECT_FILE: &str = "wayfarer.toml";

/// Which config layer a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    User,
    Project,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layer::User => "user",
            Layer::Project => "project",
        })
    }
}

/// One config file that was considered while loading.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub layer: Layer,
    pub path: PathBuf,
    /// Whether the file existed and was merged.
    pub loaded: bool,
}

/// The merged configuration together with how it was assembled.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: WayfarerConfig,
    /// Every layer considered, lowest precedence first.
    pub sources: Vec<ConfigSource>,
    /// Layers that existed but could not be read.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Paths of the layers that were merged.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Resolved locations for one run of the client.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    config_dir: Option<PathBuf>,
    project_dir: PathBuf,
}

impl ConfigPaths {
    /// Locations from the environment and the working directory.
    pub fn discover() -> Self {
        Self::new(default_config_dir(), ".")
    }

    /// Explicit locations; `config_dir: None` means there is no user layer.
    pub fn new(config_dir: Option<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir,
            project_dir: project_dir.into(),
        }
    }

    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.config_dir.as_ref().map(|d| d.join("logs"))
    }

    /// Config files in merge order.
    pub fn layers(&self) -> Vec<(Layer, PathBuf)> {
        let mut layers = Vec::with_capacity(2);
        if let Some(dir) = &self.config_dir {
            layers.push((Layer::User, dir.join(USER_FILE)));
        }
        layers.push((Layer::Project, self.project_dir.join(PROJECT_FILE)));
        layers
    }

    /// Read and merge every layer, then validate the result.
    ///
    /// A missing file is skipped silently; an unreadable one becomes a
    /// warning. Only invalid merged values fail loading.
    pub fn load(&self) -> Result<LoadedConfig> {
        let mut config = WayfarerConfig::new();
        let mut warnings = Vec::new();

        let sources = self
            .layers()
            .into_iter()
            .map(|(layer, path)| {
                let loaded = match read_layer(&path) {
                    Ok(Some(layer_config)) => {
                        config.merge(layer_config);
                        true
                    }
                    Ok(None) => false,
                    Err(e) => {
                        warnings.push(format!("Skipping {} config: {}", layer, e));
                        false
                    }
                };
                ConfigSource {
                    layer,
                    path,
                    loaded,
                }
            })
            .collect();

        config.validate()?;

        Ok(LoadedConfig {
            config,
            sources,
            warnings,
        })
    }
}

/// Parse one config file.
pub fn load_config_file(path: &Path) -> Result<WayfarerConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    WayfarerConfig::from_toml(&contents)
}

/// Directory for saved sessions: the configured one, else `sessions/` in
/// the platform data directory.
pub fn storage_dir(config: &WayfarerConfig) -> Option<PathBuf> {
    config
        .storage
        .as_ref()
        .and_then(|s| s.dir.clone())
        .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR).join("sessions")))
}

fn read_layer(path: &Path) -> Result<Option<WayfarerConfig>> {
    if !path.is_file() {
        return Ok(None);
    }
    load_config_file(path).map(Some)
}

fn default_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join(APP_DIR)),
    }
}
