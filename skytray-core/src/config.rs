use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::UnitPreference;

pub const DEFAULT_INTERVAL_MINUTES: u32 = 15;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Refresh interval. Only these three values are offered in the menu; anything
/// else found on disk falls back to the 15-minute default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshInterval {
    #[default]
    Minutes15,
    Minutes30,
    Minutes60,
}

impl RefreshInterval {
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        match minutes {
            15 => Some(RefreshInterval::Minutes15),
            30 => Some(RefreshInterval::Minutes30),
            60 => Some(RefreshInterval::Minutes60),
            _ => None,
        }
    }

    pub fn minutes(self) -> u32 {
        match self {
            RefreshInterval::Minutes15 => 15,
            RefreshInterval::Minutes30 => 30,
            RefreshInterval::Minutes60 => 60,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::from_secs(u64::from(self.minutes()) * 60)
    }

    pub const fn all() -> &'static [RefreshInterval] {
        &[
            RefreshInterval::Minutes15,
            RefreshInterval::Minutes30,
            RefreshInterval::Minutes60,
        ]
    }
}

/// The sanitized preferences a refresh cycle actually consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub unit: UnitPreference,
    pub interval: RefreshInterval,
}

impl Default for Preferences {
    fn default() -> Self {
        Config::default().preferences()
    }
}

/// Preferences as stored on disk.
///
/// Example TOML:
/// ```toml
/// unit = "imperial"
/// interval_minutes = 30
/// zipcode = "98101"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Temperature unit, `imperial` or `celsius`.
    pub unit: UnitPreference,

    /// Refresh interval in minutes; one of 15, 30, 60.
    pub interval_minutes: u32,

    /// Optional zipcode override; when set it wins over IP detection.
    pub zipcode: Option<String>,

    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unit: UnitPreference::default(),
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            zipcode: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load config from disk, or return the default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Like [`Config::load`], but an unreadable or unparseable file degrades
    /// to the defaults with a warning instead of failing the process.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!("using default preferences: {err:#}");
                Self::default()
            }
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skytray", "skytray")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Sanitize the stored values into what the scheduler consumes. An
    /// unsupported interval falls back to the documented default.
    pub fn preferences(&self) -> Preferences {
        let interval = RefreshInterval::from_minutes(self.interval_minutes).unwrap_or_else(|| {
            tracing::warn!(
                "unsupported interval_minutes = {}, falling back to {} minutes",
                self.interval_minutes,
                DEFAULT_INTERVAL_MINUTES
            );
            RefreshInterval::default()
        });

        Preferences {
            unit: self.unit,
            interval,
        }
    }

    /// Bounded per-request timeout; a stored zero falls back to the default.
    pub fn http_timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            tracing::warn!(
                "timeout_secs = 0 is invalid, falling back to {DEFAULT_TIMEOUT_SECS} seconds"
            );
            return Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        }
        Duration::from_secs(self.timeout_secs)
    }
}
