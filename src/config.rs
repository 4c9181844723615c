//! File configuration and run-settings resolution.
//!
//! Precedence for every knob: command-line override, then the config file,
//! then the built-in default.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::acquire::BackendSettings;
use crate::library::DEFAULT_COVER_TIMEOUT;
use crate::sync::{MAX_CONCURRENCY, MIN_CONCURRENCY, SyncSettings};

/// Directory name under the XDG config home.
pub const CONFIG_DIR_NAME: &str = "playlist-sync";

/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

const MAX_DELAY_MS: u64 = 60_000;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file '{}' does not exist\n  Suggestion: check the --config path", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for `{field}`: {value}. Expected range: {expected}")]
    Invalid {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, value: impl ToString, expected: &'static str) -> Self {
        Self::Invalid {
            field,
            value: value.to_string(),
            expected,
        }
    }
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// TOML-backed defaults. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub concurrency: Option<usize>,
    pub item_delay_ms: Option<u64>,
    pub page_delay_ms: Option<u64>,
    pub yt_dlp_path: Option<PathBuf>,
    pub ffmpeg_location: Option<PathBuf>,
    pub cookie_file: Option<PathBuf>,
    /// MP3 bitrate in kbit/s.
    pub audio_quality: Option<u32>,
    pub retries: Option<u32>,
    pub fragment_retries: Option<u32>,
    pub retry_sleep_secs: Option<u64>,
    pub cover_timeout_secs: Option<u64>,
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for syntax errors, unknown keys and
    /// wrongly typed values, attributed to `path`.
    pub fn from_toml(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first out-of-range key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(concurrency) = self.concurrency {
            validate_concurrency(concurrency)?;
        }
        validate_max("item_delay_ms", self.item_delay_ms, MAX_DELAY_MS, "0..=60000")?;
        validate_max("page_delay_ms", self.page_delay_ms, MAX_DELAY_MS, "0..=60000")?;
        if let Some(quality) = self.audio_quality
            && !(32..=320).contains(&quality)
        {
            return Err(ConfigError::invalid("audio_quality", quality, "32..=320"));
        }
        validate_max("retries", self.retries.map(u64::from), 20, "0..=20")?;
        validate_max(
            "fragment_retries",
            self.fragment_retries.map(u64::from),
            50,
            "0..=50",
        )?;
        validate_max("retry_sleep_secs", self.retry_sleep_secs, 300, "0..=300")?;
        if let Some(timeout) = self.cover_timeout_secs
            && !(1..=120).contains(&timeout)
        {
            return Err(ConfigError::invalid("cover_timeout_secs", timeout, "1..=120"));
        }
        Ok(())
    }
}

fn validate_concurrency(value: usize) -> Result<(), ConfigError> {
    if (MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid("concurrency", value, "1..=8"))
    }
}

fn validate_max(
    field: &'static str,
    value: Option<u64>,
    max: u64,
    expected: &'static str,
) -> Result<(), ConfigError> {
    match value {
        Some(value) if value > max => Err(ConfigError::invalid(field, value, expected)),
        _ => Ok(()),
    }
}

/// Outcome of config discovery.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Path that was consulted, when one could be determined.
    pub path: Option<PathBuf>,
    pub config: FileConfig,
    pub loaded_from_file: bool,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/playlist-sync/config.toml`
/// 2. `$HOME/.config/playlist-sync/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    resolve_config_path_with(|name| std::env::var_os(name))
}

fn resolve_config_path_with(lookup: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

    if let Some(xdg) = non_empty("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg)
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }
    let home = non_empty("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

/// Loads and validates configuration.
///
/// An `explicit` path must exist. Without one, the default path is used if a
/// file is there; a missing default file yields an empty config.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, parsed or validated,
/// or when an explicit path does not exist.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Some(path.to_path_buf())
        }
        None => resolve_default_config_path(),
    };

    let Some(existing) = path.as_deref().filter(|p| p.is_file()) else {
        debug!(path = ?path, "no config file, using defaults");
        return Ok(LoadedConfig {
            path,
            config: FileConfig::default(),
            loaded_from_file: false,
        });
    };

    let raw = fs::read_to_string(existing).map_err(|source| ConfigError::Read {
        path: existing.to_path_buf(),
        source,
    })?;
    let config = FileConfig::from_toml(&raw, existing)?;
    config.validate()?;
    debug!(path = %existing.display(), "loaded config file");

    Ok(LoadedConfig {
        path,
        config,
        loaded_from_file: true,
    })
}

/// Values given on the command line; `None` defers to the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub concurrency: Option<usize>,
    pub item_delay_ms: Option<u64>,
    pub page_delay_ms: Option<u64>,
    pub yt_dlp_path: Option<PathBuf>,
    pub ffmpeg_location: Option<PathBuf>,
    pub cookie_file: Option<PathBuf>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub sync: SyncSettings,
    pub backend: BackendSettings,
    pub cover_timeout: Duration,
    pub verbosity: Option<VerbositySetting>,
}

impl RunSettings {
    /// Merges `overrides` over `file` over defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a command-line value is out of
    /// range (file values are checked by [`FileConfig::validate`]).
    pub fn resolve(file: &FileConfig, overrides: &Overrides) -> Result<Self, ConfigError> {
        let sync_defaults = SyncSettings::default();
        let backend_defaults = BackendSettings::default();

        let concurrency = overrides
            .concurrency
            .or(file.concurrency)
            .unwrap_or(sync_defaults.concurrency);
        validate_concurrency(concurrency)?;

        let item_delay_ms = overrides.item_delay_ms.or(file.item_delay_ms);
        validate_max("item_delay_ms", item_delay_ms, MAX_DELAY_MS, "0..=60000")?;
        let page_delay_ms = overrides.page_delay_ms.or(file.page_delay_ms);
        validate_max("page_delay_ms", page_delay_ms, MAX_DELAY_MS, "0..=60000")?;

        let sync = SyncSettings {
            concurrency,
            item_delay: item_delay_ms.map_or(sync_defaults.item_delay, Duration::from_millis),
            page_delay: page_delay_ms.map_or(sync_defaults.page_delay, Duration::from_millis),
        };

        let backend = BackendSettings {
            yt_dlp_path: overrides
                .yt_dlp_path
                .clone()
                .or_else(|| file.yt_dlp_path.clone())
                .unwrap_or(backend_defaults.yt_dlp_path),
            ffmpeg_location: overrides
                .ffmpeg_location
                .clone()
                .or_else(|| file.ffmpeg_location.clone()),
            cookie_file: overrides
                .cookie_file
                .clone()
                .or_else(|| file.cookie_file.clone()),
            audio_quality: file.audio_quality.unwrap_or(backend_defaults.audio_quality),
            retries: file.retries.unwrap_or(backend_defaults.retries),
            fragment_retries: file
                .fragment_retries
                .unwrap_or(backend_defaults.fragment_retries),
            retry_sleep: file
                .retry_sleep_secs
                .map_or(backend_defaults.retry_sleep, Duration::from_secs),
        };

        Ok(Self {
            sync,
            backend,
            cover_timeout: file
                .cover_timeout_secs
                .map_or(DEFAULT_COVER_TIMEOUT, Duration::from_secs),
            verbosity: file.verbosity,
        })
    }
}
