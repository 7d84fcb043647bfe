//! Command implementations for the Hass CLI

pub mod analytics;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hass_config::Config;

/// Load the configuration file.
///
/// An explicit path must exist. Without one, `hass.toml` then
/// `config.toml` in the working directory are tried before falling back to
/// defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(p) = path {
        return Config::from_file(p)
            .with_context(|| format!("failed to load config '{}'", p.display()));
    }

    let default_paths = [PathBuf::from("hass.toml"), PathBuf::from("config.toml")];
    for p in &default_paths {
        if p.exists() {
            return Config::from_file(p)
                .with_context(|| format!("failed to load config '{}'", p.display()));
        }
    }

    Ok(Config::default())
}
