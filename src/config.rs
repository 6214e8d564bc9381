//! Persisted settings.
//!
//! Sources are layered with the `config` crate, later ones winning:
//!
//! 1. Built-in defaults
//! 2. `$XDG_CONFIG_HOME/checkwatch/config.{yaml,toml,json}` (or
//!    `~/.config/checkwatch/...`), or the file given with `--config`
//! 3. `CHECKWATCH_*` environment variables, `__` separating nested keys
//!    (e.g. `CHECKWATCH_COLORS__FAILURE=196`)
//!
//! Command line flags are applied on top by the caller.
//!
//! ```yaml
//! refresh_interval: 10s
//! redraw_interval: 500ms
//! colors:
//!   success: 10
//!   failure: 9
//!   running: 11
//!   queued: 8
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::timing::parse_duration;
use crate::runtime::REDRAW_INTERVAL;

const ENV_PREFIX: &str = "CHECKWATCH";

/// ANSI 256-color palette indexes for check states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ColorSettings {
    pub success: u8,
    pub failure: u8,
    pub running: u8,
    pub queued: u8,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            success: 10,
            failure: 9,
            running: 11,
            queued: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base interval between snapshot fetches.
    pub refresh_interval: Duration,
    /// How often the interactive view redraws while idle.
    pub redraw_interval: Duration,
    pub colors: ColorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5),
            redraw_interval: REDRAW_INTERVAL,
            colors: ColorSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    refresh_interval: String,
    redraw_interval: String,
    colors: ColorSettings,
}

impl Settings {
    /// Load settings from the default or an explicit config file plus the
    /// environment.
    ///
    /// A missing default file is fine; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) => Some(File::from(path).required(true)),
            None => default_config_base()
                .map(|base| File::with_name(&base.to_string_lossy()).required(false)),
        };

        Self::from_sources(
            file,
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
    }

    fn from_sources<F>(file: Option<F>, env: Environment) -> Result<Self>
    where
        F: config::Source + Send + Sync + 'static,
    {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("refresh_interval", "5s")?
            .set_default("redraw_interval", "1s")?
            .set_default("colors.success", i64::from(defaults.colors.success))?
            .set_default("colors.failure", i64::from(defaults.colors.failure))?
            .set_default("colors.running", i64::from(defaults.colors.running))?
            .set_default("colors.queued", i64::from(defaults.colors.queued))?;

        if let Some(file) = file {
            builder = builder.add_source(file);
        }

        let raw: RawSettings = builder
            .add_source(env)
            .build()
            .context("failed to load configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        let refresh_interval = parse_duration(&raw.refresh_interval)
            .with_context(|| format!("invalid refresh_interval {:?}", raw.refresh_interval))?;
        let redraw_interval = parse_duration(&raw.redraw_interval)
            .with_context(|| format!("invalid redraw_interval {:?}", raw.redraw_interval))?;
        Self {
            refresh_interval,
            redraw_interval,
            colors: raw.colors,
        }
        .validated()
    }

    /// Override the refresh interval (from the command line).
    pub fn with_refresh_interval(mut self, interval: Duration) -> Result<Self> {
        self.refresh_interval = interval;
        self.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.refresh_interval.is_zero() {
            bail!("refresh_interval must be greater than zero");
        }
        if self.redraw_interval.is_zero() {
            bail!("redraw_interval must be greater than zero");
        }
        Ok(self)
    }
}

/// `<config dir>/checkwatch/config`, extension left for the loader to find.
fn default_config_base() -> Option<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(config_dir.join("checkwatch").join("config"))
}
