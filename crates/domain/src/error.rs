//! Common error types used across the workspace.
//!
//! Each layer keeps typed errors and converts into [`BreezeError`] via
//! `#[from]`; no bare `String` variants, so callers can match on causes.

use crate::mode::Mode;
use crate::trigger::TriggerKind;

/// Umbrella error for the engine and its ports.
#[derive(Debug, thiserror::Error)]
pub enum BreezeError {
    /// A domain invariant was violated while constructing a value.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The device interface failed to poll or to apply a command.
    #[error("device interface error")]
    Device(#[from] DeviceError),

    /// The calendar provider failed to deliver the open-event set.
    #[error("calendar provider error")]
    Calendar(#[from] CalendarError),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Manual fan levels go from 0 to 4.
    #[error("manual level {0} is out of range 0..=4")]
    InvalidManualLevel(u8),

    /// Week program indices go from 0 to 10.
    #[error("week program index {0} is out of range 0..=10")]
    InvalidWeekProgram(u8),

    /// A mode string did not match any known operating intent.
    #[error("unknown mode: {0}")]
    UnknownMode(String),

    /// A calendar keyword did not match the fixed vocabulary.
    #[error("unknown calendar keyword: {0}")]
    UnknownKeyword(String),
}

/// Failure reported by a device adapter.
#[derive(Debug, thiserror::Error)]
#[error("device unavailable: {reason}")]
pub struct DeviceError {
    /// Human-readable cause, e.g. transport details from the adapter.
    pub reason: String,
}

/// Failure reported by a calendar adapter.
#[derive(Debug, thiserror::Error)]
#[error("calendar unavailable: {reason}")]
pub struct CalendarError {
    /// Human-readable cause from the adapter.
    pub reason: String,
}

/// Degraded-but-not-fatal conditions detected during a tick.
///
/// Faults never halt arbitration; the affected source degrades to "no
/// candidate" and the condition is surfaced on the tick outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    /// A configured trigger input did not resolve to a boolean. The trigger
    /// is held in `Idle` until the input reads as a boolean again.
    #[error("trigger input for {kind} is not a boolean; holding the trigger idle")]
    InvalidTriggerInput {
        /// The trigger whose input is degraded.
        kind: TriggerKind,
    },

    /// The wall clock stepped backwards between ticks; the tick time was
    /// clamped to stay monotonic.
    #[error("clock skew detected: now stepped backwards by {backwards_ms}ms")]
    ClockSkew {
        /// How far backwards the clock stepped, in milliseconds.
        backwards_ms: i64,
    },

    /// A revert-stack pop named a mode the device can no longer take; the
    /// entry was discarded and the default operation applies instead.
    #[error("stale revert entry for mode {mode}; falling back to the default operation")]
    StaleRevertEntry {
        /// The mode the discarded entry pointed at.
        mode: Mode,
    },
}
