//! User settings from `config.toml`.
//!
//! ```toml
//! default_sheet = "Model"
//! substitute_values = true
//! max_depth = 256
//! ```

use anyhow::{Context, Result};
use directories::ProjectDirs;
use gridflat_engine::engine::FlattenOptions;
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sheet made active when `--sheet` is not given.
    pub default_sheet: Option<String>,
    #[serde(flatten)]
    pub options: FlattenOptions,
}

pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridflat")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

/// Load settings. An explicit path must exist and parse; the user config is
/// optional and a broken one only produces a warning.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let Some(path) = user_config_path() else {
        return Ok(Config::default());
    };
    if !path.is_file() {
        debug!("no user config at {}", path.display());
        return Ok(Config::default());
    }

    match read_config(&path) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("ignoring {}: {:#}", path.display(), e);
            Ok(Config::default())
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&content).with_context(|| format!("invalid config {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}
