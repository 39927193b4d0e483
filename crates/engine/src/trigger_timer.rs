//! Trigger timers — one hysteresis state machine per adaptive trigger kind.
//!
//! Each timer walks `Idle → Active → CoolingDown → Idle`. Activation
//! snapshots the mode that was in effect so the engine can revert to it
//! when the cooldown finally elapses; re-triggering during the cooldown
//! re-arms the full timeout. Timers are independent, injectable structs
//! polled by the orchestrator, so kinds can be added without touching
//! arbitration logic.

use breeze_domain::candidate::Candidate;
use breeze_domain::error::Fault;
use breeze_domain::mode::Mode;
use breeze_domain::time::{Interval, Timestamp};
use breeze_domain::trigger::{TriggerKind, TriggerPhase};

/// Per-kind configuration, re-read every tick so option changes take
/// effect immediately.
#[derive(Debug, Clone, Copy)]
pub struct TriggerConfig {
    /// Feature switch for this trigger.
    pub enabled: bool,
    /// The mode this trigger requests while active (its operation
    /// selection).
    pub target: Mode,
    /// Hysteresis timeout applied after the input deactivates.
    pub timeout: Interval,
}

/// Mutable state of one adaptive trigger. Owned exclusively by the engine
/// instance for one device.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerState {
    /// Current lifecycle phase.
    pub phase: TriggerPhase,
    /// Last boolean input reading.
    pub input_active: bool,
    /// Deadline of the running cooldown, if any.
    pub cooldown_deadline: Option<Timestamp>,
    /// Mode in effect immediately before this trigger fired.
    pub pre_trigger_mode: Option<Mode>,
    /// Set once the degraded-input fault has been reported, cleared when
    /// the input reads as a boolean again.
    input_fault_reported: bool,
}

/// What one timer contributed this tick.
#[derive(Debug, Default)]
pub struct TriggerUpdate {
    /// Candidate while the trigger is `Active` or `CoolingDown`.
    pub candidate: Option<Candidate>,
    /// Mode to revert to, emitted on the tick the cooldown elapses.
    pub revert: Option<Mode>,
    /// Degraded-input report, raised once per outage.
    pub fault: Option<Fault>,
}

/// State machine for a single adaptive trigger kind.
#[derive(Debug)]
pub struct TriggerTimer {
    kind: TriggerKind,
    state: TriggerState,
}

impl TriggerTimer {
    /// Create an idle timer for `kind`.
    #[must_use]
    pub fn new(kind: TriggerKind) -> Self {
        Self {
            kind,
            state: TriggerState::default(),
        }
    }

    /// The kind this timer tracks.
    #[must_use]
    pub fn kind(&self) -> TriggerKind {
        self.kind
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    /// Time left on the running cooldown, if one is pending.
    #[must_use]
    pub fn remaining_cooldown(&self, now: Timestamp) -> Option<Interval> {
        self.state.cooldown_deadline.map(|deadline| deadline - now)
    }

    /// Advance the state machine by one tick.
    ///
    /// `input` is tri-state: `None` means the configured input entity did
    /// not resolve to a boolean, which forces the timer idle until it
    /// recovers. `reference_mode` is the mode that was in effect on the
    /// previous tick, snapshotted on activation for the later revert.
    pub fn update(
        &mut self,
        input: Option<bool>,
        config: &TriggerConfig,
        reference_mode: Mode,
        now: Timestamp,
    ) -> TriggerUpdate {
        let mut update = TriggerUpdate::default();

        let Some(active) = input else {
            if !self.state.input_fault_reported {
                self.state.input_fault_reported = true;
                update.fault = Some(Fault::InvalidTriggerInput { kind: self.kind });
                tracing::warn!(kind = %self.kind, "trigger input is not a boolean, holding idle");
            }
            self.clear();
            return update;
        };
        self.state.input_fault_reported = false;
        self.state.input_active = active;

        // Manual disable always wins over any timeout: drop straight to
        // Idle and forget the snapshot, so a later re-enable while the
        // input is still active re-snapshots from scratch.
        if !config.enabled {
            self.clear();
            return update;
        }

        match self.state.phase {
            TriggerPhase::Idle => {
                if active {
                    self.state.phase = TriggerPhase::Active;
                    self.state.pre_trigger_mode = Some(reference_mode);
                    tracing::debug!(kind = %self.kind, pre = %reference_mode, "trigger activated");
                }
            }
            TriggerPhase::Active => {
                if !active {
                    self.state.phase = TriggerPhase::CoolingDown;
                    self.state.cooldown_deadline = Some(now + config.timeout);
                    tracing::debug!(kind = %self.kind, "trigger cooling down");
                }
            }
            TriggerPhase::CoolingDown => {
                if active {
                    // Re-trigger: back to Active, the deadline is cleared
                    // and re-armed at the full duration on the next exit.
                    self.state.phase = TriggerPhase::Active;
                    self.state.cooldown_deadline = None;
                    tracing::debug!(kind = %self.kind, "trigger re-armed during cooldown");
                } else if self.state.cooldown_deadline.is_some_and(|d| d <= now) {
                    self.state.phase = TriggerPhase::Idle;
                    self.state.cooldown_deadline = None;
                    update.revert = self.state.pre_trigger_mode.take();
                    tracing::debug!(kind = %self.kind, revert = ?update.revert, "cooldown elapsed");
                }
            }
        }

        if matches!(
            self.state.phase,
            TriggerPhase::Active | TriggerPhase::CoolingDown
        ) {
            update.candidate = Some(Candidate::trigger(self.kind, config.target));
        }

        update
    }

    /// Synchronously drop any pending cooldown and snapshot, returning the
    /// timer to `Idle`. Used on manual override and engine teardown.
    pub fn clear(&mut self) {
        self.state.phase = TriggerPhase::Idle;
        self.state.cooldown_deadline = None;
        self.state.pre_trigger_mode = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breeze_domain::candidate::CandidateSource;
    use chrono::{TimeZone, Utc};

    fn t(minutes: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap() + Interval::minutes(minutes)
    }

    fn config() -> TriggerConfig {
        TriggerConfig {
            enabled: true,
            target: Mode::Manual(3),
            timeout: Interval::minutes(10),
        }
    }

    #[test]
    fn should_activate_and_snapshot_previous_mode() {
        let mut timer = TriggerTimer::new(TriggerKind::Boost);
        let update = timer.update(Some(true), &config(), Mode::Automatic, t(0));

        assert_eq!(timer.state().phase, TriggerPhase::Active);
        assert_eq!(timer.state().pre_trigger_mode, Some(Mode::Automatic));
        let candidate = update.candidate.unwrap();
        assert_eq!(candidate.mode, Mode::Manual(3));
        assert_eq!(
            candidate.source,
            CandidateSource::Trigger(TriggerKind::Boost)
        );
    }

    #[test]
    fn should_stay_idle_while_input_inactive() {
        let mut timer = TriggerTimer::new(TriggerKind::Eco);
        let update = timer.update(Some(false), &config(), Mode::Automatic, t(0));
        assert_eq!(timer.state().phase, TriggerPhase::Idle);
        assert!(update.candidate.is_none());
        assert!(update.revert.is_none());
    }

    #[test]
    fn should_start_cooldown_when_input_deactivates() {
        let mut timer = TriggerTimer::new(TriggerKind::Boost);
        timer.update(Some(true), &config(), Mode::Automatic, t(0));
        let update = timer.update(Some(false), &config(), Mode::Manual(3), t(1));

        assert_eq!(timer.state().phase, TriggerPhase::CoolingDown);
        assert_eq!(timer.state().cooldown_deadline, Some(t(11)));
        // Still contributes its candidate during cooldown.
        assert!(update.candidate.is_some());
    }

    #[test]
    fn should_reset_cooldown_to_full_timeout_on_re_trigger() {
        let mut timer = TriggerTimer::new(TriggerKind::Boost);
        timer.update(Some(true), &config(), Mode::Automatic, t(0));
        timer.update(Some(false), &config(), Mode::Manual(3), t(1));

        // Wait half the timeout, re-trigger, deactivate again.
        timer.update(Some(true), &config(), Mode::Manual(3), t(6));
        assert_eq!(timer.state().phase, TriggerPhase::Active);
        assert!(timer.state().cooldown_deadline.is_none());

        timer.update(Some(false), &config(), Mode::Manual(3), t(7));
        let remaining = timer.remaining_cooldown(t(7)).unwrap();
        assert_eq!(remaining, Interval::minutes(10));
    }

    #[test]
    fn should_revert_to_snapshot_when_cooldown_elapses() {
        let mut timer = TriggerTimer::new(TriggerKind::Boost);
        timer.update(Some(true), &config(), Mode::Automatic, t(0));
        timer.update(Some(false), &config(), Mode::Manual(3), t(1));

        let before = timer.update(Some(false), &config(), Mode::Manual(3), t(10));
        assert!(before.revert.is_none());

        let after = timer.update(Some(false), &config(), Mode::Manual(3), t(12));
        assert_eq!(after.revert, Some(Mode::Automatic));
        assert_eq!(timer.state().phase, TriggerPhase::Idle);
        assert!(after.candidate.is_none());
    }

    #[test]
    fn should_drop_to_idle_immediately_when_disabled() {
        let mut timer = TriggerTimer::new(TriggerKind::Home);
        timer.update(Some(true), &config(), Mode::Automatic, t(0));
        timer.update(Some(false), &config(), Mode::Automatic, t(1));
        assert_eq!(timer.state().phase, TriggerPhase::CoolingDown);

        let disabled = TriggerConfig {
            enabled: false,
            ..config()
        };
        let update = timer.update(Some(false), &disabled, Mode::Automatic, t(2));
        assert_eq!(timer.state().phase, TriggerPhase::Idle);
        assert!(timer.state().cooldown_deadline.is_none());
        assert!(update.candidate.is_none());
        // No revert either: disabling swallows the pending fallback.
        assert!(update.revert.is_none());
    }

    #[test]
    fn should_re_snapshot_after_disable_enable_cycle_with_input_held() {
        let mut timer = TriggerTimer::new(TriggerKind::Boost);
        timer.update(Some(true), &config(), Mode::Automatic, t(0));
        assert_eq!(timer.state().pre_trigger_mode, Some(Mode::Automatic));

        let disabled = TriggerConfig {
            enabled: false,
            ..config()
        };
        timer.update(Some(true), &disabled, Mode::Night, t(1));
        assert_eq!(timer.state().phase, TriggerPhase::Idle);
        assert!(timer.state().pre_trigger_mode.is_none());

        // Re-enable with the input still held: fresh activation, fresh
        // snapshot of whatever is in effect now.
        timer.update(Some(true), &config(), Mode::Night, t(2));
        assert_eq!(timer.state().phase, TriggerPhase::Active);
        assert_eq!(timer.state().pre_trigger_mode, Some(Mode::Night));
    }

    #[test]
    fn should_report_invalid_input_once_and_hold_idle() {
        let mut timer = TriggerTimer::new(TriggerKind::Eco);
        timer.update(Some(true), &config(), Mode::Automatic, t(0));

        let first = timer.update(None, &config(), Mode::Automatic, t(1));
        assert_eq!(
            first.fault,
            Some(Fault::InvalidTriggerInput {
                kind: TriggerKind::Eco
            })
        );
        assert_eq!(timer.state().phase, TriggerPhase::Idle);
        assert!(first.candidate.is_none());

        // Repeated outage ticks stay silent.
        let second = timer.update(None, &config(), Mode::Automatic, t(2));
        assert!(second.fault.is_none());

        // Recovery re-arms fault reporting and normal operation.
        let recovered = timer.update(Some(true), &config(), Mode::Automatic, t(3));
        assert!(recovered.candidate.is_some());
        let outage = timer.update(None, &config(), Mode::Automatic, t(4));
        assert!(outage.fault.is_some());
    }

    #[test]
    fn should_clear_pending_cooldown_on_clear() {
        let mut timer = TriggerTimer::new(TriggerKind::Boost);
        timer.update(Some(true), &config(), Mode::Automatic, t(0));
        timer.update(Some(false), &config(), Mode::Manual(3), t(1));
        assert!(timer.state().cooldown_deadline.is_some());

        timer.clear();
        assert_eq!(timer.state().phase, TriggerPhase::Idle);
        assert!(timer.state().cooldown_deadline.is_none());
        assert!(timer.state().pre_trigger_mode.is_none());

        // The swallowed cooldown never comes back as a revert.
        let update = timer.update(Some(false), &config(), Mode::Manual(3), t(20));
        assert!(update.revert.is_none());
    }
}
