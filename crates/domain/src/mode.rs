//! Mode — the operating intent requested of the ventilation unit.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of manual fan levels the unit exposes (0 through 4).
pub const MANUAL_LEVEL_MAX: u8 = 4;

/// Number of week programs the unit can store.
pub const WEEK_PROGRAM_COUNT: u8 = 11;

/// A single operating intent. Immutable once constructed; levels and week
/// program indices are validated by the [`Mode::manual`] and
/// [`Mode::week_program`] constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Mode {
    /// Unit stopped, dampers closed.
    Standby,
    /// Demand-driven automatic operation.
    Automatic,
    /// Fixed manual fan level, 0–4.
    Manual(u8),
    /// One of the stored week programs, index 0–10.
    WeekProgram(u8),
    /// Away / extended absence operation.
    Away,
    /// Summer mode (bypass-friendly, reduced exchange).
    Summer,
    /// Fireplace assist (temporary supply overpressure).
    Fireplace,
    /// Night setback.
    Night,
}

impl Mode {
    /// Construct a manual mode after validating the fan level.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidManualLevel`] when `level` exceeds
    /// [`MANUAL_LEVEL_MAX`].
    pub fn manual(level: u8) -> Result<Self, ValidationError> {
        if level > MANUAL_LEVEL_MAX {
            return Err(ValidationError::InvalidManualLevel(level));
        }
        Ok(Self::Manual(level))
    }

    /// Construct a week-program mode after validating the index.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidWeekProgram`] when `index` is not
    /// below [`WEEK_PROGRAM_COUNT`].
    pub fn week_program(index: u8) -> Result<Self, ValidationError> {
        if index >= WEEK_PROGRAM_COUNT {
            return Err(ValidationError::InvalidWeekProgram(index));
        }
        Ok(Self::WeekProgram(index))
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standby => f.write_str("standby"),
            Self::Automatic => f.write_str("automatic"),
            Self::Manual(level) => write!(f, "level_{level}"),
            Self::WeekProgram(index) => write!(f, "week_program_{index}"),
            Self::Away => f.write_str("away"),
            Self::Summer => f.write_str("summer"),
            Self::Fireplace => f.write_str("fireplace"),
            Self::Night => f.write_str("night"),
        }
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standby" => Ok(Self::Standby),
            "automatic" => Ok(Self::Automatic),
            "away" => Ok(Self::Away),
            "summer" => Ok(Self::Summer),
            "fireplace" => Ok(Self::Fireplace),
            "night" => Ok(Self::Night),
            // Bare "week_program" selects the first stored program.
            "week_program" => Ok(Self::WeekProgram(0)),
            other => {
                if let Some(level) = other.strip_prefix("level_") {
                    let level = level
                        .parse()
                        .map_err(|_| ValidationError::UnknownMode(other.to_string()))?;
                    return Self::manual(level);
                }
                if let Some(index) = other.strip_prefix("week_program_") {
                    let index = index
                        .parse()
                        .map_err(|_| ValidationError::UnknownMode(other.to_string()))?;
                    return Self::week_program(index);
                }
                Err(ValidationError::UnknownMode(other.to_string()))
            }
        }
    }
}
