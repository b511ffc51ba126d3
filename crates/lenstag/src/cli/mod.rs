//! Command implementations.

pub mod config;
pub mod serve;
pub mod tag;
pub mod types;

use lenstag_core::Config;
use std::path::{Path, PathBuf};

/// Load the config file (explicit path or platform default) and apply
/// `LENSTAG_*` environment overrides.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(&expand_path(path))?,
        None => Config::load()?,
    };
    config.apply_env_overrides()?;
    Ok(config)
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
