//! Config file location.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Application directory name under the XDG config root.
const APP_DIR: &str = "cinedex";

/// Resolves the config file path.
///
/// Lookup order:
/// 1. `{dir}/config.toml` when `--dir` is given.
/// 2. `$XDG_CONFIG_HOME/cinedex/config.toml` when set and non-empty.
/// 3. `~/.config/cinedex/config.toml`.
///
/// # Errors
///
/// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is usable
/// (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }

    let xdg = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let root = config_root(xdg.as_deref(), home.as_deref())
        .context("neither XDG_CONFIG_HOME nor HOME environment variable is set")?;
    Ok(root.join(APP_DIR).join(CONFIG_FILE))
}

/// Picks the config root from `XDG_CONFIG_HOME` and `HOME`.
fn config_root(xdg: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    xdg.filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| home.map(|h| h.join(".config")))
}
