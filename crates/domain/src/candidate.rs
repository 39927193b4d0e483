//! Candidate — a proposed operating mode competing for the device.
//!
//! Every source (manual override, adaptive trigger, calendar, default
//! baseline) contributes at most one candidate per tick; the arbiter
//! reduces the collected list to a single winner.

use serde::{Deserialize, Serialize};

use crate::mode::Mode;
use crate::trigger::TriggerKind;

/// Priority of the default/baseline fallback. Ties with a week-program
/// calendar event on purpose; registration order breaks the tie in the
/// calendar's favor.
pub const PRIORITY_BASELINE: u8 = 0;

/// Momentary priority of a direct user override. Pre-empts everything for
/// the tick on which it is issued.
pub const PRIORITY_MANUAL: u8 = u8::MAX;

/// Origin of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CandidateSource {
    /// Direct user operation-selection write.
    Manual,
    /// One of the adaptive triggers.
    Trigger(TriggerKind),
    /// The currently dominating calendar event.
    Calendar,
    /// The engine's baseline fallback.
    Default,
}

impl std::fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => f.write_str("manual"),
            Self::Trigger(kind) => write!(f, "trigger({kind})"),
            Self::Calendar => f.write_str("calendar"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// One proposed mode with its priority and origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// The proposed operating intent.
    pub mode: Mode,
    /// Arbitration priority; numerically higher wins.
    pub priority: u8,
    /// Where the proposal came from.
    pub source: CandidateSource,
}

impl Candidate {
    /// Candidate contributed by an adaptive trigger at its fixed priority.
    #[must_use]
    pub fn trigger(kind: TriggerKind, mode: Mode) -> Self {
        Self {
            mode,
            priority: kind.priority(),
            source: CandidateSource::Trigger(kind),
        }
    }

    /// Candidate contributed by the dominating calendar event.
    #[must_use]
    pub fn calendar(mode: Mode, priority: u8) -> Self {
        Self {
            mode,
            priority,
            source: CandidateSource::Calendar,
        }
    }

    /// The always-present baseline fallback.
    #[must_use]
    pub fn baseline(mode: Mode) -> Self {
        Self {
            mode,
            priority: PRIORITY_BASELINE,
            source: CandidateSource::Default,
        }
    }

    /// A direct user override, valid for a single tick.
    #[must_use]
    pub fn manual(mode: Mode) -> Self {
        Self {
            mode,
            priority: PRIORITY_MANUAL,
            source: CandidateSource::Manual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_give_manual_the_highest_priority() {
        let manual = Candidate::manual(Mode::Manual(2));
        let trigger = Candidate::trigger(TriggerKind::Boost, Mode::Manual(4));
        assert!(manual.priority > trigger.priority);
    }

    #[test]
    fn should_give_baseline_the_lowest_priority() {
        let baseline = Candidate::baseline(Mode::Automatic);
        assert_eq!(baseline.priority, PRIORITY_BASELINE);
        assert_eq!(baseline.source, CandidateSource::Default);
    }

    #[test]
    fn should_carry_the_trigger_kind_priority() {
        let candidate = Candidate::trigger(TriggerKind::Eco, Mode::Manual(1));
        assert_eq!(candidate.priority, TriggerKind::Eco.priority());
        assert_eq!(
            candidate.source,
            CandidateSource::Trigger(TriggerKind::Eco)
        );
    }

    #[test]
    fn should_display_source_variants() {
        assert_eq!(CandidateSource::Manual.to_string(), "manual");
        assert_eq!(
            CandidateSource::Trigger(TriggerKind::Home).to_string(),
            "trigger(home)"
        );
        assert_eq!(CandidateSource::Default.to_string(), "default");
    }

    #[test]
    fn should_roundtrip_candidate_through_serde_json() {
        let candidate = Candidate::calendar(Mode::Away, 11);
        let json = serde_json::to_string(&candidate).unwrap();
        let parsed: Candidate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, candidate);
    }
}
