//! Calendar vocabulary — event keywords and the fixed priority table.
//!
//! The priority numbers are the authoritative, most recent documented order
//! (Away highest); an earlier revision of the source material listed Boost
//! above Away, which is recorded as a discrepancy in `DESIGN.md`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::EventId;
use crate::time::Timestamp;

/// The fixed keyword vocabulary scheduled events may carry.
///
/// Ordered by [`priority`](Self::priority):
/// `WeekProgram 0 < Automatic 1 < Standby 2 < Level1..4 3..6 < Eco 7
/// < Home 8 < Night 9 < Boost 10 < Away 11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EventKeyword {
    /// Run the stored week program for the event's duration.
    WeekProgram,
    /// Direct switch to automatic operation.
    Automatic,
    /// Direct switch to standby.
    Standby,
    /// Direct switch to a fixed manual level, 1–4.
    Level(u8),
    /// Toggle-style: enable eco for the duration.
    Eco,
    /// Toggle-style: enable home for the duration.
    Home,
    /// Toggle-style: enable night setback for the duration.
    Night,
    /// Toggle-style: enable boost for the duration.
    Boost,
    /// Toggle-style: enable away for the duration.
    Away,
}

impl EventKeyword {
    /// Construct a level keyword after validating the fan level.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidManualLevel`] when `level` is not
    /// in `1..=4`.
    pub fn level(level: u8) -> Result<Self, ValidationError> {
        if !(1..=4).contains(&level) {
            return Err(ValidationError::InvalidManualLevel(level));
        }
        Ok(Self::Level(level))
    }

    /// Fixed arbitration priority of this keyword.
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            Self::WeekProgram => 0,
            Self::Automatic => 1,
            Self::Standby => 2,
            Self::Level(level) => 2 + level,
            Self::Eco => 7,
            Self::Home => 8,
            Self::Night => 9,
            Self::Boost => 10,
            Self::Away => 11,
        }
    }

    /// Whether this keyword enables a feature for the event's duration
    /// (toggle-style) rather than switching the mode directly.
    #[must_use]
    pub fn is_toggle(self) -> bool {
        matches!(
            self,
            Self::Away | Self::Night | Self::Boost | Self::Home | Self::Eco
        )
    }
}

impl std::fmt::Display for EventKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WeekProgram => f.write_str("week_program"),
            Self::Automatic => f.write_str("automatic"),
            Self::Standby => f.write_str("standby"),
            Self::Level(level) => write!(f, "level_{level}"),
            Self::Eco => f.write_str("eco"),
            Self::Home => f.write_str("home"),
            Self::Night => f.write_str("night"),
            Self::Boost => f.write_str("boost"),
            Self::Away => f.write_str("away"),
        }
    }
}

impl FromStr for EventKeyword {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week_program" => Ok(Self::WeekProgram),
            "automatic" => Ok(Self::Automatic),
            "standby" => Ok(Self::Standby),
            "eco" => Ok(Self::Eco),
            "home" => Ok(Self::Home),
            "night" => Ok(Self::Night),
            "boost" => Ok(Self::Boost),
            "away" => Ok(Self::Away),
            other => {
                if let Some(level) = other.strip_prefix("level_") {
                    let level = level
                        .parse()
                        .map_err(|_| ValidationError::UnknownKeyword(other.to_string()))?;
                    return Self::level(level);
                }
                Err(ValidationError::UnknownKeyword(other.to_string()))
            }
        }
    }
}

/// A scheduled event, already resolved by the calendar provider: the engine
/// only ever sees the set of events open at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Stable identity used to diff the open set between ticks.
    pub id: EventId,
    /// The keyword naming the scheduled intent.
    pub keyword: EventKeyword,
    /// Start of the event window.
    pub starts_at: Timestamp,
    /// End of the event window.
    pub ends_at: Timestamp,
}

impl CalendarEvent {
    /// Create an event with a fresh identity.
    #[must_use]
    pub fn new(keyword: EventKeyword, starts_at: Timestamp, ends_at: Timestamp) -> Self {
        Self {
            id: EventId::new(),
            keyword,
            starts_at,
            ends_at,
        }
    }

    /// Priority inherited from the keyword.
    #[must_use]
    pub fn priority(&self) -> u8 {
        self.keyword.priority()
    }

    /// Whether the event window contains `now` (half-open `[start, end)`).
    #[must_use]
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.starts_at <= now && now < self.ends_at
    }
}
