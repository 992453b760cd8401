//! Application directory paths.
//!
//! Uses the [`dirs`] crate for platform-appropriate resolution.
//!
//! # Environment Overrides
//!
//! - `PLACEFINDER_CONFIG_DIR` overrides [`config_dir`]

use std::path::PathBuf;

/// Environment variable overriding [`config_dir`].
pub const CONFIG_DIR_ENV: &str = "PLACEFINDER_CONFIG_DIR";

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/placefinder/` by default
/// (`~/.config/placefinder/` on Linux).
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("placefinder"))
        .unwrap_or_else(|| PathBuf::from("/tmp/placefinder-config"))
}

/// Default config file: `config.toml` inside [`config_dir`].
#[must_use]
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}
