//! Config file location.
//!
//! Lookup order: `--dir`, `MOVIEDB_CONFIG_DIR`, `$XDG_CONFIG_HOME/moviedb`,
//! `$HOME/.config/moviedb`. Blank environment values are ignored.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "MOVIEDB_CONFIG_DIR";

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Resolves the config file path from `dir` and the process environment.
///
/// # Errors
///
/// Returns an error if no directory is given and neither
/// `MOVIEDB_CONFIG_DIR`, `XDG_CONFIG_HOME` nor `HOME` is set.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    config_path_from(
        dir.map(PathBuf::as_path),
        std::env::var_os(CONFIG_DIR_ENV),
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
}

/// Applies the lookup order to explicitly supplied values.
fn config_path_from(
    dir: Option<&Path>,
    config_dir: Option<OsString>,
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }
    if let Some(d) = non_blank(config_dir) {
        return Ok(PathBuf::from(d).join(CONFIG_FILE));
    }
    if let Some(xdg) = non_blank(xdg_config_home) {
        return Ok(PathBuf::from(xdg).join("moviedb").join(CONFIG_FILE));
    }
    if let Some(home) = non_blank(home) {
        return Ok(PathBuf::from(home)
            .join(".config")
            .join("moviedb")
            .join(CONFIG_FILE));
    }
    bail!("cannot locate config: pass --dir or set {CONFIG_DIR_ENV} or HOME")
}

fn non_blank(value: Option<OsString>) -> Option<OsString> {
    value.filter(|v| !v.to_string_lossy().trim().is_empty())
}
