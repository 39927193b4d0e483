//! Calendar port — the schedule feeding the resolver.

use std::future::Future;

use breeze_domain::calendar::CalendarEvent;
use breeze_domain::error::BreezeError;
use breeze_domain::time::Timestamp;

/// Source of scheduled events for one device.
pub trait CalendarSource {
    /// Events whose window contains `now`.
    fn open_events(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<CalendarEvent>, BreezeError>> + Send;
}
