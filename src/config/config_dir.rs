//! Locating `config.toml`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, ConfigResult};

/// Explicit path to the config file, checked before anything else.
pub const CONFIG_PATH_VAR: &str = "CODECAMP_CONFIG";
const CONFIG_FILE_NAME: &str = "config.toml";

fn user_config_dir() -> Option<PathBuf> {
    if cfg!(windows) {
        return std::env::var_os("APPDATA").map(PathBuf::from);
    }

    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Lookup order: the explicit path, then `./config.toml` for local runs,
/// otherwise the per-user config dir with `./config.toml` as the last resort.
fn candidates(
    use_local: bool,
    explicit: Option<OsString>,
    user_dir: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = explicit.map(PathBuf::from).into_iter().collect();

    if let Some(dir) = user_dir.filter(|_| !use_local) {
        paths.push(dir.join(crate::APPLICATION_NAME).join(CONFIG_FILE_NAME));
    }
    paths.push(Path::new(".").join(CONFIG_FILE_NAME));
    paths
}

fn first_existing(paths: Vec<PathBuf>) -> Option<PathBuf> {
    paths.into_iter().find(|p| p.is_file())
}

pub fn find_config_file(use_local: bool) -> Option<PathBuf> {
    let paths = candidates(
        use_local,
        std::env::var_os(CONFIG_PATH_VAR),
        user_config_dir(),
    );
    tracing::trace!("config candidates: {paths:?}");
    first_existing(paths)
}

pub fn read_config(use_local: bool) -> ConfigResult<String> {
    let path = find_config_file(use_local).ok_or(ConfigError::ConfigNotFound)?;
    tracing::debug!("using {} as configuration file", path.display());

    Ok(std::fs::read_to_string(path)?)
}
