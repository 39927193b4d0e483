//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for event windows, cooldown deadlines, and tick times.
pub type Timestamp = DateTime<Utc>;

/// Interval type used for trigger timeouts and the mode-change hold-off.
pub type Interval = chrono::Duration;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
