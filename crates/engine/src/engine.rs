//! Control engine — per-tick orchestration for one managed device.
//!
//! Strict tick order: sensor filtering, trigger timers, calendar
//! resolution, candidate assembly, arbitration, command emission. All
//! state transitions for a tick are computed from one monotonic time
//! snapshot before arbitration runs; unchanged ticks emit no device
//! command. A second managed device gets its own fully independent
//! instance of every component.

use breeze_domain::adaptive::AdaptiveState;
use breeze_domain::calendar::CalendarEvent;
use breeze_domain::candidate::{Candidate, CandidateSource};
use breeze_domain::error::Fault;
use breeze_domain::mode::Mode;
use breeze_domain::time::Timestamp;
use breeze_domain::trigger::TriggerKind;

use crate::arbiter::arbitrate;
use crate::calendar_resolver::CalendarResolver;
use crate::config::EngineConfig;
use crate::filter::{SensorChannel, SensorFilter};
use crate::trigger_timer::TriggerTimer;

/// Tri-state boolean inputs for the three adaptive triggers. `None` means
/// the configured input entity did not resolve to a boolean.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerInputs {
    /// Boost trigger input.
    pub boost: Option<bool>,
    /// Eco trigger input.
    pub eco: Option<bool>,
    /// Home trigger input.
    pub home: Option<bool>,
}

impl TriggerInputs {
    /// All three inputs reading `false`.
    #[must_use]
    pub fn inactive() -> Self {
        Self {
            boost: Some(false),
            eco: Some(false),
            home: Some(false),
        }
    }

    /// Input reading for one kind.
    #[must_use]
    pub fn get(&self, kind: TriggerKind) -> Option<bool> {
        match kind {
            TriggerKind::Boost => self.boost,
            TriggerKind::Eco => self.eco,
            TriggerKind::Home => self.home,
        }
    }
}

/// Everything the engine consumes on one tick, gathered by the service
/// from the device and calendar ports.
#[derive(Debug, Clone)]
pub struct TickInput {
    /// Wall-clock time at tick start.
    pub now: Timestamp,
    /// Raw readings per monitored channel.
    pub sensors: Vec<(SensorChannel, f64)>,
    /// Adaptive trigger inputs.
    pub triggers: TriggerInputs,
    /// Currently open calendar events.
    pub calendar: Vec<CalendarEvent>,
}

impl TickInput {
    /// A quiet tick at `now`: no sensors, inactive triggers, no events.
    #[must_use]
    pub fn quiet(now: Timestamp) -> Self {
        Self {
            now,
            sensors: Vec::new(),
            triggers: TriggerInputs::inactive(),
            calendar: Vec::new(),
        }
    }
}

/// Everything the engine produced on one tick.
#[derive(Debug)]
pub struct TickOutcome {
    /// The mode that won arbitration.
    pub mode: Mode,
    /// Device command to emit, present only when the mode changed.
    pub command: Option<Mode>,
    /// Which adaptive source dominates, for observability.
    pub adaptive: AdaptiveState,
    /// Filtered sensor values, for the reporting layer.
    pub filtered: Vec<(SensorChannel, f64)>,
    /// Degraded conditions encountered this tick.
    pub faults: Vec<Fault>,
}

/// Mode arbitration & scheduling engine for a single ventilation unit.
pub struct ControlEngine {
    config: EngineConfig,
    filter: SensorFilter,
    timers: [TriggerTimer; 3],
    resolver: CalendarResolver,
    /// The fallback mode: the default operation selection, moved along by
    /// manual overrides and reverts so that ending a pre-emption restores
    /// exactly the pre-empted mode.
    baseline: Mode,
    /// Winner of the previous tick.
    current: Option<Candidate>,
    last_now: Option<Timestamp>,
    hold_off_until: Option<Timestamp>,
    pending_manual: Option<Mode>,
}

impl ControlEngine {
    /// Create an engine for one device.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let mut filter = SensorFilter::new();
        filter.set_bypass(!config.filtering);
        Self {
            filter,
            timers: TriggerKind::ALL.map(TriggerTimer::new),
            resolver: CalendarResolver::new(config.calendar_targets),
            baseline: config.default_mode,
            current: None,
            last_now: None,
            hold_off_until: None,
            pending_manual: None,
            config,
        }
    }

    /// Queue a direct user override, applied on the next tick. It wins
    /// that tick outright and resets the arbitration context (pending
    /// cooldowns and the revert stack).
    pub fn request_manual(&mut self, mode: Mode) {
        self.pending_manual = Some(mode);
    }

    /// Toggle the sensor stability filter. History keeps being recorded
    /// while bypassed.
    pub fn set_filtering(&mut self, enabled: bool) {
        self.config.filtering = enabled;
        self.filter.set_bypass(!enabled);
    }

    /// The mode currently commanded, if a tick has run.
    #[must_use]
    pub fn current_mode(&self) -> Option<Mode> {
        self.current.map(|c| c.mode)
    }

    /// Inspect the calendar revert stack.
    #[must_use]
    pub fn revert_stack(&self) -> &crate::revert_stack::RevertStack {
        self.resolver.stack()
    }

    /// Run one evaluation tick.
    pub fn tick(&mut self, input: TickInput) -> TickOutcome {
        let mut faults = Vec::new();
        let now = self.monotonic_now(input.now, &mut faults);

        // 1. Sensor filtering.
        let filtered = input
            .sensors
            .iter()
            .map(|&(channel, raw)| (channel, self.filter.update(channel, raw)))
            .collect();

        // Direct user override: reset arbitration context before the
        // sources run, so nothing fights the user's intent afterwards.
        let manual = self.pending_manual.take();
        if let Some(mode) = manual {
            for timer in &mut self.timers {
                timer.clear();
            }
            self.resolver.clear_stack();
            self.baseline = mode;
            tracing::info!(mode = %mode, "manual override, arbitration context cleared");
        }

        // 2. Trigger timers. Reverts land on the baseline immediately;
        //    the calendar resolver runs after them, so a coinciding
        //    calendar revert lands last.
        let reference_mode = manual
            .or_else(|| self.current_mode())
            .unwrap_or(self.baseline);
        let mut trigger_candidates = Vec::new();
        let mut trigger_reverts = Vec::new();
        for timer in &mut self.timers {
            let kind = timer.kind();
            let update = timer.update(
                input.triggers.get(kind),
                self.config.triggers.get(kind),
                reference_mode,
                now,
            );
            if let Some(candidate) = update.candidate {
                trigger_candidates.push(candidate);
            }
            if let Some(fault) = update.fault {
                faults.push(fault);
            }
            if let Some(mode) = update.revert {
                trigger_reverts.push(mode);
            }
        }
        for mode in trigger_reverts {
            self.apply_revert(mode, &mut faults);
        }

        // 3. Calendar resolution, against the best non-calendar effect.
        let mut candidates = Vec::new();
        if let Some(mode) = manual {
            candidates.push(Candidate::manual(mode));
        }
        candidates.extend(&trigger_candidates);
        let non_calendar_best = arbitrate(&candidates)
            .unwrap_or_else(|| Candidate::baseline(self.baseline));
        let calendar = self
            .resolver
            .resolve(&input.calendar, non_calendar_best, now);
        if let Some(entry) = calendar.revert {
            self.apply_revert(entry.mode, &mut faults);
        }

        // 4. Candidate assembly: manual, triggers, calendar, baseline —
        //    registration order doubles as the tie-breaker.
        if let Some(candidate) = calendar.candidate {
            candidates.push(candidate);
        }
        candidates.push(Candidate::baseline(self.baseline));

        // 5. Arbitration.
        let mut winner = arbitrate(&candidates)
            .unwrap_or_else(|| Candidate::baseline(self.baseline));

        // Oscillation damping: adaptive changes inside the hold-off
        // window are deferred; manual overrides pass through.
        if winner.source != CandidateSource::Manual {
            if let Some(current) = self.current {
                let held = self.hold_off_until.is_some_and(|until| now < until);
                if held && winner.mode != current.mode {
                    tracing::debug!(
                        deferred = %winner.mode,
                        keeping = %current.mode,
                        "mode change deferred by hold-off",
                    );
                    winner = current;
                }
            }
        }

        // 6. Command emission, only on change.
        let command = if self.current_mode() == Some(winner.mode) {
            None
        } else {
            self.hold_off_until = Some(now + self.config.hold_off);
            tracing::info!(mode = %winner.mode, source = %winner.source, "operation change");
            Some(winner.mode)
        };
        self.current = Some(winner);

        let adaptive = match winner.source {
            CandidateSource::Trigger(kind) => AdaptiveState::Trigger(kind),
            CandidateSource::Calendar => calendar
                .keyword
                .map_or(AdaptiveState::None, AdaptiveState::Calendar),
            CandidateSource::Manual | CandidateSource::Default => AdaptiveState::None,
        };

        TickOutcome {
            mode: winner.mode,
            command,
            adaptive,
            filtered,
            faults,
        }
    }

    /// Synchronous teardown: no orphaned cooldowns, revert entries, or
    /// sensor history survive.
    pub fn shutdown(&mut self) {
        for timer in &mut self.timers {
            timer.clear();
        }
        self.resolver.clear();
        self.filter.reset();
        self.baseline = self.config.default_mode;
        self.current = None;
        self.last_now = None;
        self.hold_off_until = None;
        self.pending_manual = None;
    }

    /// Move the baseline to a reverted-to mode, degrading to the default
    /// operation when the entry went stale.
    fn apply_revert(&mut self, mode: Mode, faults: &mut Vec<Fault>) {
        if self.config.mode_is_valid(mode) {
            tracing::debug!(mode = %mode, "reverting baseline");
            self.baseline = mode;
        } else {
            tracing::warn!(mode = %mode, "stale revert entry, using default operation");
            faults.push(Fault::StaleRevertEntry { mode });
            self.baseline = self.config.default_mode;
        }
    }

    /// Clamp the tick time to stay monotonic across wall-clock steps, so
    /// cooldown deadlines never appear expired deep in the past.
    fn monotonic_now(&mut self, now: Timestamp, faults: &mut Vec<Fault>) -> Timestamp {
        let now = match self.last_now {
            Some(last) if now < last => {
                let backwards_ms = (last - now).num_milliseconds();
                tracing::warn!(backwards_ms, "clock skew detected, clamping tick time");
                faults.push(Fault::ClockSkew { backwards_ms });
                last
            }
            _ => now,
        };
        self.last_now = Some(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breeze_domain::calendar::EventKeyword;
    use breeze_domain::time::Interval;
    use chrono::{TimeZone, Utc};

    fn t(minutes: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 14, 6, 0, 0).unwrap() + Interval::minutes(minutes)
    }

    /// Hold-off disabled so focused tests see changes immediately.
    fn config() -> EngineConfig {
        EngineConfig {
            hold_off: Interval::zero(),
            ..EngineConfig::default()
        }
    }

    fn quiet(minutes: i64) -> TickInput {
        TickInput::quiet(t(minutes))
    }

    fn with_boost(minutes: i64, active: bool) -> TickInput {
        TickInput {
            triggers: TriggerInputs {
                boost: Some(active),
                ..TriggerInputs::inactive()
            },
            ..TickInput::quiet(t(minutes))
        }
    }

    #[test]
    fn should_command_default_mode_on_first_tick() {
        let mut engine = ControlEngine::new(config());
        let outcome = engine.tick(quiet(0));
        assert_eq!(outcome.mode, Mode::Automatic);
        assert_eq!(outcome.command, Some(Mode::Automatic));
        assert_eq!(outcome.adaptive, AdaptiveState::None);
    }

    #[test]
    fn should_not_command_again_while_nothing_changes() {
        let mut engine = ControlEngine::new(config());
        engine.tick(quiet(0));
        let outcome = engine.tick(quiet(1));
        assert_eq!(outcome.mode, Mode::Automatic);
        assert!(outcome.command.is_none());
    }

    #[test]
    fn should_let_trigger_win_and_revert_after_cooldown() {
        let mut engine = ControlEngine::new(config());
        engine.tick(quiet(0));

        let fired = engine.tick(with_boost(1, true));
        assert_eq!(fired.command, Some(Mode::Manual(3)));
        assert_eq!(fired.adaptive, AdaptiveState::Trigger(TriggerKind::Boost));

        // Input drops: candidate persists through the cooldown.
        let cooling = engine.tick(with_boost(2, false));
        assert!(cooling.command.is_none());
        assert_eq!(cooling.mode, Mode::Manual(3));

        // Cooldown (5 min default) elapses: back to the snapshot.
        let reverted = engine.tick(with_boost(8, false));
        assert_eq!(reverted.command, Some(Mode::Automatic));
        assert_eq!(reverted.adaptive, AdaptiveState::None);
    }

    #[test]
    fn should_let_manual_override_win_and_cancel_pending_revert() {
        let mut engine = ControlEngine::new(config());
        engine.tick(quiet(0));
        engine.tick(with_boost(1, true));
        engine.tick(with_boost(2, false));

        engine.request_manual(Mode::Standby);
        let overridden = engine.tick(with_boost(3, false));
        assert_eq!(overridden.command, Some(Mode::Standby));
        assert_eq!(overridden.adaptive, AdaptiveState::None);

        // Past the old cooldown deadline: the cleared timer stays silent
        // and the user's mode holds.
        let later = engine.tick(with_boost(10, false));
        assert!(later.command.is_none());
        assert_eq!(later.mode, Mode::Standby);
    }

    #[test]
    fn should_let_manual_override_beat_open_calendar_event() {
        let mut engine = ControlEngine::new(config());
        let away = CalendarEvent::new(EventKeyword::Away, t(0), t(60));
        let open = vec![away];

        let scheduled = engine.tick(TickInput {
            calendar: open.clone(),
            ..TickInput::quiet(t(0))
        });
        assert_eq!(scheduled.mode, Mode::Away);

        engine.request_manual(Mode::Manual(2));
        let overridden = engine.tick(TickInput {
            calendar: open,
            ..TickInput::quiet(t(1))
        });
        assert_eq!(overridden.command, Some(Mode::Manual(2)));
        assert!(engine.revert_stack().is_empty());
    }

    #[test]
    fn should_revert_to_baseline_after_nested_event_expires_early() {
        let mut engine = ControlEngine::new(config());
        engine.tick(quiet(0));

        let eco = CalendarEvent::new(EventKeyword::Eco, t(1), t(30));
        let away = CalendarEvent::new(EventKeyword::Away, t(10), t(60));

        let eco_open = engine.tick(TickInput {
            calendar: vec![eco.clone()],
            ..TickInput::quiet(t(1))
        });
        assert_eq!(eco_open.command, Some(Mode::Manual(1)));

        let both_open = engine.tick(TickInput {
            calendar: vec![eco, away.clone()],
            ..TickInput::quiet(t(10))
        });
        assert_eq!(both_open.command, Some(Mode::Away));

        // Eco expires while away still holds the unit: no visible change,
        // but eco's record leaves the stack so it cannot come back later.
        let eco_gone = engine.tick(TickInput {
            calendar: vec![away],
            ..TickInput::quiet(t(30))
        });
        assert!(eco_gone.command.is_none());
        assert_eq!(eco_gone.mode, Mode::Away);

        let closed = engine.tick(quiet(60));
        assert_eq!(closed.command, Some(Mode::Automatic));
        assert!(engine.revert_stack().is_empty());
    }

    #[test]
    fn should_defer_adaptive_change_during_hold_off_but_not_manual() {
        let mut engine = ControlEngine::new(EngineConfig::default());
        engine.tick(quiet(0)); // first command arms the 2-minute hold-off

        let deferred = engine.tick(with_boost(1, true));
        assert!(deferred.command.is_none());
        assert_eq!(deferred.mode, Mode::Automatic);

        engine.request_manual(Mode::Standby);
        let manual = engine.tick(quiet(1));
        assert_eq!(manual.command, Some(Mode::Standby));

        // Once the window passes, adaptive changes go through again.
        let adaptive = engine.tick(with_boost(5, true));
        assert_eq!(adaptive.command, Some(Mode::Manual(3)));
    }

    #[test]
    fn should_report_clock_skew_and_stay_monotonic() {
        let mut engine = ControlEngine::new(config());
        engine.tick(quiet(10));

        let skewed = engine.tick(quiet(5));
        assert!(matches!(
            skewed.faults.as_slice(),
            [Fault::ClockSkew { backwards_ms }] if *backwards_ms == 5 * 60 * 1000
        ));
    }

    #[test]
    fn should_keep_cooldown_deadline_intact_across_clock_skew() {
        let mut engine = ControlEngine::new(config());
        engine.tick(quiet(0));
        engine.tick(with_boost(1, true));
        engine.tick(with_boost(2, false)); // deadline at t(7)

        // The wall clock steps back; the clamped tick must not expire the
        // cooldown early, nor lose it.
        let skewed = engine.tick(with_boost(1, false));
        assert_eq!(skewed.mode, Mode::Manual(3));

        let reverted = engine.tick(with_boost(8, false));
        assert_eq!(reverted.command, Some(Mode::Automatic));
    }

    #[test]
    fn should_degrade_invalid_trigger_input_to_default() {
        let mut engine = ControlEngine::new(config());
        engine.tick(quiet(0));

        let broken = TickInput {
            triggers: TriggerInputs {
                boost: None,
                ..TriggerInputs::inactive()
            },
            ..TickInput::quiet(t(1))
        };
        let outcome = engine.tick(broken.clone());
        assert_eq!(outcome.mode, Mode::Automatic);
        assert!(matches!(
            outcome.faults.as_slice(),
            [Fault::InvalidTriggerInput {
                kind: TriggerKind::Boost
            }]
        ));

        // Reported once, not every tick.
        let next = engine.tick(TickInput {
            now: t(2),
            ..broken
        });
        assert!(next.faults.is_empty());
    }

    #[test]
    fn should_let_calendar_revert_land_last_when_coinciding_with_cooldown() {
        // Eco trigger fires over the automatic baseline, then a night
        // event pre-empts it. The trigger cooldown and the event end both
        // land on the same tick: triggers are processed first, so the
        // calendar revert is the one left on the baseline.
        let mut engine = ControlEngine::new(config());
        engine.tick(quiet(0));

        let eco_on = TickInput {
            triggers: TriggerInputs {
                eco: Some(true),
                ..TriggerInputs::inactive()
            },
            ..TickInput::quiet(t(1))
        };
        let fired = engine.tick(eco_on);
        assert_eq!(fired.mode, Mode::Manual(1));

        let night = CalendarEvent::new(EventKeyword::Night, t(2), t(7));
        let pre_empted = engine.tick(TickInput {
            calendar: vec![night.clone()],
            triggers: TriggerInputs {
                eco: Some(true),
                ..TriggerInputs::inactive()
            },
            ..TickInput::quiet(t(2))
        });
        assert_eq!(pre_empted.mode, Mode::Night);
        assert_eq!(engine.revert_stack().top().unwrap().mode, Mode::Manual(1));

        // Eco input drops at t(2): cooldown deadline t(7), the same
        // instant the night event ends.
        engine.tick(TickInput {
            calendar: vec![night],
            triggers: TriggerInputs {
                eco: Some(false),
                ..TriggerInputs::inactive()
            },
            ..TickInput::quiet(t(2))
        });

        let coincided = engine.tick(quiet(7));
        // Calendar pop restores the eco target (the mode in effect when
        // night started), overriding the trigger's earlier revert.
        assert_eq!(coincided.mode, Mode::Manual(1));
    }

    #[test]
    fn should_fault_on_stale_revert_and_fall_back_to_default() {
        // The override targets a program slot the device no longer
        // reports; by the time the event ends, the snapshot is stale.
        let mut engine = ControlEngine::new(EngineConfig {
            week_program_count: 1,
            ..config()
        });
        engine.tick(quiet(0));
        engine.request_manual(Mode::WeekProgram(5));
        engine.tick(quiet(1));
        let away = CalendarEvent::new(EventKeyword::Away, t(2), t(10));
        engine.tick(TickInput {
            calendar: vec![away],
            ..TickInput::quiet(t(2))
        });
        let ended = engine.tick(quiet(10));
        assert!(matches!(
            ended.faults.as_slice(),
            [Fault::StaleRevertEntry {
                mode: Mode::WeekProgram(5)
            }]
        ));
        assert_eq!(ended.mode, Mode::Automatic);
    }

    #[test]
    fn should_filter_sensor_readings_through_the_stability_filter() {
        let mut engine = ControlEngine::new(config());
        for minute in 0..5 {
            engine.tick(TickInput {
                sensors: vec![(SensorChannel::Room, 21.0)],
                ..TickInput::quiet(t(minute))
            });
        }
        let outcome = engine.tick(TickInput {
            sensors: vec![(SensorChannel::Room, 40.0)],
            ..TickInput::quiet(t(5))
        });
        let (_, filtered) = outcome.filtered[0];
        assert!((filtered - 21.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_pass_raw_readings_when_filtering_disabled() {
        let mut engine = ControlEngine::new(EngineConfig {
            filtering: false,
            ..config()
        });
        for minute in 0..5 {
            engine.tick(TickInput {
                sensors: vec![(SensorChannel::Room, 21.0)],
                ..TickInput::quiet(t(minute))
            });
        }
        let outcome = engine.tick(TickInput {
            sensors: vec![(SensorChannel::Room, 40.0)],
            ..TickInput::quiet(t(5))
        });
        let (_, filtered) = outcome.filtered[0];
        assert!((filtered - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_clear_everything_on_shutdown() {
        let mut engine = ControlEngine::new(config());
        engine.tick(quiet(0));
        engine.tick(with_boost(1, true));
        engine.tick(with_boost(2, false));
        let away = CalendarEvent::new(EventKeyword::Away, t(3), t(60));
        engine.tick(TickInput {
            calendar: vec![away],
            ..TickInput::quiet(t(3))
        });

        engine.shutdown();
        assert!(engine.revert_stack().is_empty());
        assert!(engine.current_mode().is_none());

        // Restart: no ghost revert from the pre-shutdown cooldown, and the
        // first tick re-commands the default.
        let fresh = engine.tick(quiet(30));
        assert_eq!(fresh.command, Some(Mode::Automatic));
    }
}
