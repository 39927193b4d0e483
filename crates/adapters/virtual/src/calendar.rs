//! Fixed schedule — an in-memory calendar of pre-programmed events.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use breeze_domain::calendar::CalendarEvent;
use breeze_domain::error::BreezeError;
use breeze_domain::time::Timestamp;
use breeze_engine::ports::calendar::CalendarSource;

/// Serves whichever of its events are open at the query time.
#[derive(Default)]
pub struct FixedSchedule {
    events: Mutex<Vec<CalendarEvent>>,
}

impl FixedSchedule {
    /// Add one event to the schedule.
    pub fn add_event(&self, event: CalendarEvent) {
        self.lock().push(event);
    }

    /// Replace the whole schedule.
    pub fn set_events(&self, events: Vec<CalendarEvent>) {
        *self.lock() = events;
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CalendarEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CalendarSource for FixedSchedule {
    fn open_events(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<CalendarEvent>, BreezeError>> + Send {
        let open: Vec<CalendarEvent> = self
            .lock()
            .iter()
            .filter(|event| event.is_open(now))
            .cloned()
            .collect();
        async { Ok(open) }
    }
}
