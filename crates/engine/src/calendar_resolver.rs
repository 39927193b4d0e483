//! Calendar resolver — maps open scheduled events to priority-tagged
//! candidates and maintains the revert stack across event boundaries.
//!
//! The resolver diffs the open-event set between ticks. When an event
//! starts above the current effect it pushes the pre-empted mode; when the
//! dominating event ends it pops, restoring exactly the pre-empted mode
//! unless a still-open event of equal or higher priority makes the entry
//! stale.

use breeze_domain::calendar::{CalendarEvent, EventKeyword};
use breeze_domain::candidate::Candidate;
use breeze_domain::mode::Mode;
use breeze_domain::time::Timestamp;

use crate::revert_stack::{RevertEntry, RevertStack};

/// Target modes for the toggle-style keywords, and the stored program a
/// bare week-program keyword selects. Wired from the same operation
/// selections the triggers use.
#[derive(Debug, Clone, Copy)]
pub struct KeywordTargets {
    /// Mode a boost event requests.
    pub boost: Mode,
    /// Mode an eco event requests.
    pub eco: Mode,
    /// Mode a home event requests.
    pub home: Mode,
    /// Week program index scheduled by a week-program event.
    pub week_program: u8,
}

impl Default for KeywordTargets {
    fn default() -> Self {
        Self {
            boost: Mode::Manual(3),
            eco: Mode::Manual(1),
            home: Mode::Automatic,
            week_program: 0,
        }
    }
}

impl KeywordTargets {
    /// The mode an event with `keyword` requests while open.
    #[must_use]
    pub fn mode_for(&self, keyword: EventKeyword) -> Mode {
        match keyword {
            EventKeyword::WeekProgram => Mode::WeekProgram(self.week_program),
            EventKeyword::Automatic => Mode::Automatic,
            EventKeyword::Standby => Mode::Standby,
            EventKeyword::Level(level) => Mode::Manual(level),
            EventKeyword::Eco => self.eco,
            EventKeyword::Home => self.home,
            EventKeyword::Night => Mode::Night,
            EventKeyword::Boost => self.boost,
            EventKeyword::Away => Mode::Away,
        }
    }
}

/// What the resolver contributed this tick.
#[derive(Debug, Default)]
pub struct CalendarUpdate {
    /// Candidate of the dominating open event, if any.
    pub candidate: Option<Candidate>,
    /// Keyword of that event, for the adaptive-state readout.
    pub keyword: Option<EventKeyword>,
    /// Revert applied because the dominating event ended: the entry that
    /// was popped and survived the staleness check.
    pub revert: Option<RevertEntry>,
}

/// Per-device calendar resolution state.
#[derive(Debug, Default)]
pub struct CalendarResolver {
    targets: KeywordTargets,
    /// Open events seen on the previous tick, diffed against the new set.
    tracked: Vec<CalendarEvent>,
    stack: RevertStack,
}

impl CalendarResolver {
    /// Create a resolver with the given keyword targets.
    #[must_use]
    pub fn new(targets: KeywordTargets) -> Self {
        Self {
            targets,
            tracked: Vec::new(),
            stack: RevertStack::new(),
        }
    }

    /// Inspect the revert stack.
    #[must_use]
    pub fn stack(&self) -> &RevertStack {
        &self.stack
    }

    /// Resolve the open-event set against the tracked state.
    ///
    /// `current` is the best candidate the rest of the system holds this
    /// tick (manual, triggers, baseline) — the effect a starting event has
    /// to beat before it pushes a revert entry.
    pub fn resolve(
        &mut self,
        open: &[CalendarEvent],
        current: Candidate,
        now: Timestamp,
    ) -> CalendarUpdate {
        let mut update = CalendarUpdate::default();

        let continuing_max = open
            .iter()
            .filter(|event| self.tracked.iter().any(|t| t.id == event.id))
            .map(CalendarEvent::priority)
            .max();

        // Ended events first, highest priority first, so nested pre-emptions
        // unwind in reverse order of how they stacked up.
        let mut ended: Vec<&CalendarEvent> = self
            .tracked
            .iter()
            .filter(|event| !open.iter().any(|o| o.id == event.id))
            .collect();
        ended.sort_by(|a, b| b.priority().cmp(&a.priority()));

        for event in ended {
            tracing::debug!(keyword = %event.keyword, "calendar event ended");

            // Only the dominating event can unwind the stack. An event that
            // ends underneath a still-open higher or equal one never pushed
            // the live entry; instead the record of its own reign is spliced
            // out so the later unwind falls through to what it pre-empted.
            let reign = RevertEntry {
                mode: self.targets.mode_for(event.keyword),
                priority: event.priority(),
            };
            if continuing_max.is_some_and(|max| max >= event.priority()) {
                if self.stack.remove(reign) {
                    tracing::debug!(mode = %reign.mode, "pruned reign of expired nested event");
                }
                continue;
            }
            let Some(top) = self.stack.top() else {
                continue;
            };
            if top.priority >= event.priority() {
                self.stack.remove(reign);
                continue;
            }

            let Some(entry) = self.stack.pop() else {
                continue;
            };
            if open.iter().any(|o| o.priority() >= entry.priority) {
                // Stale: a still-open event outranks the popped mode, so it
                // wins instead and the entry is discarded.
                tracing::debug!(mode = %entry.mode, "discarding stale revert entry");
            } else {
                update.revert = Some(entry);
            }
        }

        // Newly started events, lowest priority first, so that two events
        // starting on the same tick stack their pre-emptions in order.
        let mut started: Vec<&CalendarEvent> = open
            .iter()
            .filter(|event| !self.tracked.iter().any(|t| t.id == event.id))
            .collect();
        started.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.starts_at.cmp(&b.starts_at))
        });

        let mut effect = self.current_effect(open, current, update.revert);
        for event in started {
            tracing::debug!(keyword = %event.keyword, "calendar event started");
            let priority = event.priority();
            if priority > effect.priority {
                self.stack.push(RevertEntry {
                    mode: effect.mode,
                    priority: effect.priority,
                });
                effect = RevertEntry {
                    mode: self.targets.mode_for(event.keyword),
                    priority,
                };
            }
        }

        if let Some(best) = Self::dominating(open) {
            update.candidate = Some(Candidate::calendar(
                self.targets.mode_for(best.keyword),
                best.priority(),
            ));
            update.keyword = Some(best.keyword);
            tracing::debug!(keyword = %best.keyword, at = %now, "calendar candidate");
        }

        self.tracked = open.to_vec();
        update
    }

    /// Clear the revert stack only, keeping the tracked set so open events
    /// do not re-register as "started" on the next tick. Used on manual
    /// override.
    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    /// Full teardown: stack and tracked set.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.tracked.clear();
    }

    /// The effect a newly starting event must beat: the stronger of the
    /// non-calendar candidate and the best event that was already open.
    fn current_effect(
        &self,
        open: &[CalendarEvent],
        current: Candidate,
        revert: Option<RevertEntry>,
    ) -> RevertEntry {
        let continuing_best = open
            .iter()
            .filter(|event| self.tracked.iter().any(|t| t.id == event.id))
            .fold(None::<&CalendarEvent>, |best, event| match best {
                Some(b) if !Self::outranks(event, b) => Some(b),
                _ => Some(event),
            });

        let base = revert.unwrap_or(RevertEntry {
            mode: current.mode,
            priority: current.priority,
        });
        match continuing_best {
            Some(event) if event.priority() > base.priority => RevertEntry {
                mode: self.targets.mode_for(event.keyword),
                priority: event.priority(),
            },
            _ => base,
        }
    }

    /// Highest-priority open event; ties go to the earlier start (stable).
    fn dominating(open: &[CalendarEvent]) -> Option<&CalendarEvent> {
        open.iter()
            .fold(None::<&CalendarEvent>, |best, event| match best {
                Some(b) if !Self::outranks(event, b) => Some(b),
                _ => Some(event),
            })
    }

    fn outranks(a: &CalendarEvent, b: &CalendarEvent) -> bool {
        a.priority() > b.priority()
            || (a.priority() == b.priority() && a.starts_at < b.starts_at)
    }
}
