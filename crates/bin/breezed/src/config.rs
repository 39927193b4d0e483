//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `breeze.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::str::FromStr;

use breeze_domain::mode::Mode;
use breeze_domain::time::Interval;
use breeze_engine::calendar_resolver::KeywordTargets;
use breeze_engine::config::{EngineConfig, TriggerSettings};
use breeze_engine::trigger_timer::TriggerConfig;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine settings.
    pub engine: EngineSection,
    /// Adaptive trigger settings.
    pub triggers: TriggersSection,
    /// Calendar keyword targets.
    pub calendar: CalendarSection,
    /// Tick loop settings.
    pub service: ServiceSection,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Core engine settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Default operation selection (e.g. `automatic`, `level_2`).
    pub default_mode: String,
    /// Minimum seconds between adaptive mode changes.
    pub hold_off_seconds: u64,
    /// Week programs the connected unit stores.
    pub week_program_count: u8,
    /// Apply the sensor stability filter.
    pub filtering: bool,
}

/// One adaptive trigger.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TriggerSection {
    /// Whether the trigger contributes candidates at all.
    pub enabled: bool,
    /// Mode the trigger requests while active (e.g. `level_3`).
    pub target: String,
    /// Cooldown after the input goes inactive, in seconds.
    pub timeout_seconds: u64,
}

/// The three adaptive triggers.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TriggersSection {
    /// Boost trigger.
    pub boost: TriggerSection,
    /// Eco trigger.
    pub eco: TriggerSection,
    /// Home trigger.
    pub home: TriggerSection,
}

/// Targets for the toggle-style calendar keywords.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CalendarSection {
    /// Mode a `boost` event requests.
    pub boost_target: String,
    /// Mode an `eco` event requests.
    pub eco_target: String,
    /// Mode a `home` event requests.
    pub home_target: String,
    /// Stored program a bare `week_program` event selects.
    pub week_program: u8,
}

/// Tick loop settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceSection {
    /// Seconds between evaluation ticks.
    pub tick_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `breeze.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("breeze.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("BREEZE_DEFAULT_MODE") {
            self.engine.default_mode = val;
        }
        if let Ok(val) = std::env::var("BREEZE_TICK_SECONDS") {
            if let Ok(seconds) = val.parse() {
                self.service.tick_seconds = seconds;
            }
        }
        if let Ok(val) = std::env::var("BREEZE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.service.tick_seconds == 0 {
            return Err(ConfigError::Validation(
                "tick_seconds must be non-zero".to_string(),
            ));
        }
        if self.engine.week_program_count == 0 {
            return Err(ConfigError::Validation(
                "week_program_count must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the TOML values into the engine's configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when a mode string does not
    /// name a known operation selection.
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        Ok(EngineConfig {
            default_mode: parse_mode(&self.engine.default_mode)?,
            triggers: TriggerSettings {
                boost: self.triggers.boost.resolve()?,
                eco: self.triggers.eco.resolve()?,
                home: self.triggers.home.resolve()?,
            },
            calendar_targets: KeywordTargets {
                boost: parse_mode(&self.calendar.boost_target)?,
                eco: parse_mode(&self.calendar.eco_target)?,
                home: parse_mode(&self.calendar.home_target)?,
                week_program: self.calendar.week_program,
            },
            filtering: self.engine.filtering,
            hold_off: seconds(self.engine.hold_off_seconds),
            week_program_count: self.engine.week_program_count,
        })
    }
}

impl TriggerSection {
    fn resolve(&self) -> Result<TriggerConfig, ConfigError> {
        Ok(TriggerConfig {
            enabled: self.enabled,
            target: parse_mode(&self.target)?,
            timeout: seconds(self.timeout_seconds),
        })
    }
}

fn parse_mode(value: &str) -> Result<Mode, ConfigError> {
    Mode::from_str(value).map_err(|err| ConfigError::Validation(err.to_string()))
}

fn seconds(value: u64) -> Interval {
    Interval::seconds(i64::try_from(value).unwrap_or(i64::MAX))
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            default_mode: "automatic".to_string(),
            hold_off_seconds: 120,
            week_program_count: 11,
            filtering: true,
        }
    }
}

impl Default for TriggerSection {
    fn default() -> Self {
        Self {
            enabled: true,
            target: "automatic".to_string(),
            timeout_seconds: 300,
        }
    }
}

impl Default for TriggersSection {
    fn default() -> Self {
        Self {
            boost: TriggerSection {
                target: "level_3".to_string(),
                ..TriggerSection::default()
            },
            eco: TriggerSection {
                target: "level_1".to_string(),
                ..TriggerSection::default()
            },
            home: TriggerSection::default(),
        }
    }
}

impl Default for CalendarSection {
    fn default() -> Self {
        Self {
            boost_target: "level_3".to_string(),
            eco_target: "level_1".to_string(),
            home_target: "automatic".to_string(),
            week_program: 0,
        }
    }
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self { tick_seconds: 60 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "breezed=info,breeze=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
