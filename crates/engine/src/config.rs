//! Engine configuration — plain structs handed down from the composition
//! root. The configuration store itself (persistence, UI) is an external
//! collaborator; the engine only consumes the resolved values.

use breeze_domain::mode::{Mode, WEEK_PROGRAM_COUNT};
use breeze_domain::time::Interval;
use breeze_domain::trigger::TriggerKind;

use crate::calendar_resolver::KeywordTargets;
use crate::trigger_timer::TriggerConfig;

/// Per-device engine configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Default operation selection: the fallback when no trigger or
    /// calendar candidate applies and nothing was reverted to.
    pub default_mode: Mode,
    /// Adaptive trigger settings, one per kind.
    pub triggers: TriggerSettings,
    /// Targets for toggle-style calendar keywords.
    pub calendar_targets: KeywordTargets,
    /// Whether the sensor stability filter is applied (raw passthrough
    /// when false; history is still recorded).
    pub filtering: bool,
    /// Minimum gap between adaptive mode changes; damps oscillation.
    /// Manual overrides bypass it.
    pub hold_off: Interval,
    /// Week programs the connected unit actually stores. A revert to an
    /// index at or beyond this is stale.
    pub week_program_count: u8,
}

/// The three per-kind trigger configurations.
#[derive(Debug, Clone, Copy)]
pub struct TriggerSettings {
    /// Boost trigger (priority 10).
    pub boost: TriggerConfig,
    /// Eco trigger (priority 7).
    pub eco: TriggerConfig,
    /// Home trigger (priority 8).
    pub home: TriggerConfig,
}

impl TriggerSettings {
    /// Configuration for one kind.
    #[must_use]
    pub fn get(&self, kind: TriggerKind) -> &TriggerConfig {
        match kind {
            TriggerKind::Boost => &self.boost,
            TriggerKind::Eco => &self.eco,
            TriggerKind::Home => &self.home,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_mode: Mode::Automatic,
            triggers: TriggerSettings::default(),
            calendar_targets: KeywordTargets::default(),
            filtering: true,
            hold_off: Interval::minutes(2),
            week_program_count: WEEK_PROGRAM_COUNT,
        }
    }
}

impl Default for TriggerSettings {
    fn default() -> Self {
        let timeout = Interval::minutes(5);
        Self {
            boost: TriggerConfig {
                enabled: true,
                target: Mode::Manual(3),
                timeout,
            },
            eco: TriggerConfig {
                enabled: true,
                target: Mode::Manual(1),
                timeout,
            },
            home: TriggerConfig {
                enabled: true,
                target: Mode::Automatic,
                timeout,
            },
        }
    }
}

impl EngineConfig {
    /// Whether a reverted-to mode is still one the device can take.
    #[must_use]
    pub fn mode_is_valid(&self, mode: Mode) -> bool {
        match mode {
            Mode::WeekProgram(index) => index < self.week_program_count,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_automatic_with_five_minute_timeouts() {
        let config = EngineConfig::default();
        assert_eq!(config.default_mode, Mode::Automatic);
        assert_eq!(config.triggers.boost.timeout, Interval::minutes(5));
        assert_eq!(config.hold_off, Interval::minutes(2));
    }

    #[test]
    fn should_look_up_trigger_settings_by_kind() {
        let config = EngineConfig::default();
        assert_eq!(
            config.triggers.get(TriggerKind::Boost).target,
            Mode::Manual(3)
        );
        assert_eq!(
            config.triggers.get(TriggerKind::Home).target,
            Mode::Automatic
        );
    }

    #[test]
    fn should_reject_week_program_beyond_device_count() {
        let config = EngineConfig {
            week_program_count: 2,
            ..EngineConfig::default()
        };
        assert!(config.mode_is_valid(Mode::WeekProgram(1)));
        assert!(!config.mode_is_valid(Mode::WeekProgram(2)));
        assert!(config.mode_is_valid(Mode::Away));
    }
}
