//! Adaptive trigger vocabulary — the Boost/Eco/Home kinds and their phases.

use serde::{Deserialize, Serialize};

/// The three environment-driven adaptive triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// High-demand boost (e.g. humidity or presence spike).
    Boost,
    /// Low-demand eco (e.g. nobody home, low CO2).
    Eco,
    /// Return-home comfort ramp-up.
    Home,
}

impl TriggerKind {
    /// All kinds, in the order the engine polls them each tick.
    pub const ALL: [Self; 3] = [Self::Boost, Self::Eco, Self::Home];

    /// Fixed arbitration priority of this trigger kind.
    ///
    /// Sits inside the global order Away > Boost > Night > Home > Eco.
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            Self::Boost => 10,
            Self::Home => 8,
            Self::Eco => 7,
        }
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boost => f.write_str("boost"),
            Self::Eco => f.write_str("eco"),
            Self::Home => f.write_str("home"),
        }
    }
}

/// Lifecycle phase of one adaptive trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPhase {
    /// Input inactive, no pending timeout.
    #[default]
    Idle,
    /// Input currently active; the trigger's candidate is in play.
    Active,
    /// Input deactivated, hysteresis timeout running.
    CoolingDown,
}
