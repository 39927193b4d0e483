//! Adaptive state — observability readout of which source dominates.

use serde::{Deserialize, Serialize};

use crate::calendar::EventKeyword;
use crate::trigger::TriggerKind;

/// Which adaptive source currently owns the device mode, if any.
///
/// Exposed per tick so a reporting layer can show *why* the unit runs the
/// way it does. Manual and baseline operation both read as [`Self::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AdaptiveState {
    /// No adaptive source dominates.
    #[default]
    None,
    /// An adaptive trigger's candidate won arbitration.
    Trigger(TriggerKind),
    /// A calendar event's candidate won arbitration.
    Calendar(EventKeyword),
}

impl std::fmt::Display for AdaptiveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Trigger(kind) => write!(f, "trigger({kind})"),
            Self::Calendar(keyword) => write!(f, "calendar({keyword})"),
        }
    }
}
