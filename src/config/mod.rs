use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::snapshot::SNAPSHOT_LABEL;

const APP_DIR: &str = "pixelboard";
const APP_CONFIG_FILE: &str = "config.json";

pub const ENV_ARCHIVE_DIR: &str = "PIXELBOARD_ARCHIVE_DIR";
pub const ENV_PORT: &str = "PIXELBOARD_PORT";
pub const DEFAULT_PORT: u16 = 10000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The archive channel is the process's only credential; without it
    /// there is nowhere to restore from or back up to.
    #[error("missing required environment variable {ENV_ARCHIVE_DIR}")]
    MissingArchiveDir,
    #[error("invalid {ENV_PORT} value: {value}")]
    InvalidPort { value: String },
}

/// Tunables from `config.json`; every field falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub canvas_size: u32,
    pub snapshot_label: String,
    pub restore_scan_limit: usize,
    pub zoom_half_extent: u32,
    pub zoom_target_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_size: 1024,
            snapshot_label: SNAPSHOT_LABEL.to_string(),
            restore_scan_limit: crate::archive::DEFAULT_SCAN_LIMIT,
            zoom_half_extent: 50,
            zoom_target_size: 500,
        }
    }
}

/// Resolved startup configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub archive_dir: PathBuf,
    pub port: u16,
    pub settings: Settings,
}

/// Loads configuration from the environment and the optional config file.
///
/// A missing archive directory is the only fatal condition; everything
/// else has a default.
pub fn load() -> Result<Config, ConfigError> {
    load_with(
        std::env::var_os(ENV_ARCHIVE_DIR),
        std::env::var_os(ENV_PORT),
        load_settings(),
    )
}

fn load_with(
    archive_dir: Option<OsString>,
    port: Option<OsString>,
    settings: Settings,
) -> Result<Config, ConfigError> {
    let archive_dir = archive_dir
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::MissingArchiveDir)?;

    let port = match port {
        None => DEFAULT_PORT,
        Some(raw) => {
            let raw = raw.to_string_lossy().into_owned();
            raw.parse()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?
        }
    };

    Ok(Config {
        archive_dir,
        port,
        settings,
    })
}

fn load_settings() -> Settings {
    let (xdg_config_home, home) = config_env_dirs();
    load_settings_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_settings_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Settings {
    let Some(path) = app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) else {
        return Settings::default();
    };
    if !path.exists() {
        return Settings::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            Settings::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            Settings::default()
        }
    }
}

fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Option<PathBuf> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Some(path)
}

fn config_root(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Some(xdg.to_path_buf());
    }
    home.map(|home| home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_archive_dir_is_fatal() {
        let error = load_with(None, None, Settings::default())
            .expect_err("startup without the archive credential must fail");
        assert_eq!(error, ConfigError::MissingArchiveDir);

        let error = load_with(Some(OsString::new()), None, Settings::default())
            .expect_err("an empty credential is as fatal as a missing one");
        assert_eq!(error, ConfigError::MissingArchiveDir);
    }

    #[test]
    fn port_defaults_and_parses() {
        let config = load_with(Some("/tmp/archive".into()), None, Settings::default())
            .expect("config resolves");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.archive_dir, PathBuf::from("/tmp/archive"));

        let config = load_with(
            Some("/tmp/archive".into()),
            Some("8080".into()),
            Settings::default(),
        )
        .expect("config resolves");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn malformed_port_is_rejected_with_the_offending_value() {
        let error = load_with(
            Some("/tmp/archive".into()),
            Some("not-a-port".into()),
            Settings::default(),
        )
        .expect_err("bad port must fail");
        assert_eq!(
            error,
            ConfigError::InvalidPort {
                value: "not-a-port".to_string()
            }
        );
    }

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "pixelboard",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/pixelboard/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path(
            "pixelboard",
            "config.json",
            None,
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/pixelboard/config.json"));
    }

    #[test]
    fn app_config_path_is_absent_when_home_missing_and_xdg_unset() {
        assert_eq!(app_config_path("pixelboard", "config.json", None, None), None);
    }

    #[test]
    fn settings_default_matches_the_canvas_contract() {
        let settings = Settings::default();
        assert_eq!(settings.canvas_size, 1024);
        assert_eq!(settings.snapshot_label, "board.png");
        assert_eq!(settings.restore_scan_limit, 10);
        assert_eq!(settings.zoom_half_extent, 50);
        assert_eq!(settings.zoom_target_size, 500);
    }

    #[test]
    fn partial_settings_json_keeps_defaults_for_the_rest() {
        let settings: Settings =
            serde_json::from_str(r#"{"canvas_size": 256}"#).expect("partial settings parse");
        assert_eq!(settings.canvas_size, 256);
        assert_eq!(settings.restore_scan_limit, 10);
    }
}
