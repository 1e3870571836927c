//! Subcommands.

pub mod batch;
pub mod config;
pub mod mappings;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use sticker_core::models::StickerConfig;

/// Platform config location (`~/.config/sticker/config.json` on Linux).
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sticker")
        .join("config.json")
}

/// The `--config` path, or the platform default.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration. An explicit path must exist; the default path
/// falls back to built-in defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<StickerConfig> {
    if let Some(path) = explicit {
        return Ok(StickerConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(StickerConfig::from_file(&path)?)
    } else {
        Ok(StickerConfig::default())
    }
}
