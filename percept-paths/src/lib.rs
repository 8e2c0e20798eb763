//! Where percept keeps its files.
//!
//! Config is layered: a user file under `$XDG_CONFIG_HOME/percept` and a
//! project file under `.percept/` in the working directory. Collected survey
//! data (exposure ledger, results CSV) defaults to the working directory, and
//! `$XDG_DATA_HOME/percept` is the suggested home for deployments that keep it
//! away from the dataset.

use std::path::{Path, PathBuf};

/// Overrides the directory holding the project config file
pub const PROJECT_CONFIG_DIR_ENV: &str = "PERCEPT_PROJECT_CONFIG_DIR";

const APP_DIR: &str = "percept";
const CONFIG_FILE: &str = "config.toml";

/// `$<xdg_var>/percept`, else `~/<home_fallback>/percept`, else relative.
fn xdg_dir(xdg_var: &str, home_fallback: &str) -> PathBuf {
    if let Ok(base) = std::env::var(xdg_var) {
        PathBuf::from(base).join(APP_DIR)
    } else if let Some(home) = dirs::home_dir() {
        home.join(home_fallback).join(APP_DIR)
    } else {
        PathBuf::from(home_fallback).join(APP_DIR)
    }
}

/// User config directory: `$XDG_CONFIG_HOME/percept` or `~/.config/percept`.
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Data directory: `$XDG_DATA_HOME/percept` or `~/.local/share/percept`.
pub fn data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

/// The user-level config file.
///
/// # Examples
///
/// ```
/// let path = percept_paths::user_config_file();
/// assert!(path.ends_with("percept/config.toml"));
/// ```
pub fn user_config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// The project-level config file, `.percept/config.toml` unless
/// [`PROJECT_CONFIG_DIR_ENV`] points elsewhere.
pub fn project_config_file() -> PathBuf {
    match std::env::var(PROJECT_CONFIG_DIR_ENV) {
        Ok(dir) => PathBuf::from(dir).join(CONFIG_FILE),
        Err(_) => Path::new(".percept").join(CONFIG_FILE),
    }
}

/// Where a survey data file would live inside [`data_dir`].
///
/// Only the file name of `file` is kept, so configured relative paths such
/// as `out/detailed_results.csv` map to `<data_dir>/detailed_results.csv`.
pub fn data_file(file: impl AsRef<Path>) -> PathBuf {
    let file = file.as_ref();
    match file.file_name() {
        Some(name) => data_dir().join(name),
        None => data_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every env-var assertion lives in this one test so they cannot race.
    #[test]
    fn test_paths_respect_env() {
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", "/tmp/test-config");
            std::env::set_var("XDG_DATA_HOME", "/tmp/test-data");
            std::env::remove_var(PROJECT_CONFIG_DIR_ENV);
        }
        assert_eq!(
            user_config_file(),
            PathBuf::from("/tmp/test-config/percept/config.toml")
        );
        assert_eq!(
            data_file("out/detailed_results.csv"),
            PathBuf::from("/tmp/test-data/percept/detailed_results.csv")
        );
        assert_eq!(project_config_file(), PathBuf::from(".percept/config.toml"));

        unsafe { std::env::set_var(PROJECT_CONFIG_DIR_ENV, "/srv/survey") };
        assert_eq!(
            project_config_file(),
            PathBuf::from("/srv/survey/config.toml")
        );

        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
            std::env::remove_var("XDG_DATA_HOME");
            std::env::remove_var(PROJECT_CONFIG_DIR_ENV);
        }
    }

    #[test]
    fn test_data_file_without_name_is_data_dir() {
        assert!(data_file("..").ends_with("percept"));
    }
}
