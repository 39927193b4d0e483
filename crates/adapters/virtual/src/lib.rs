//! # breeze-adapter-virtual
//!
//! Virtual/demo adapter that provides a simulated ventilation unit and a
//! fixed in-memory schedule for testing and demonstration.
//!
//! ## Provided components
//!
//! | Component | Port | Behaviour |
//! |-----------|------|-----------|
//! | [`VirtualUnit`] | `DevicePort` | Holds scripted sensor readings and trigger inputs, records every commanded mode |
//! | [`FixedSchedule`] | `CalendarSource` | Serves the events whose window contains the query time |
//!
//! ## Dependency rule
//!
//! Depends on `breeze-engine` (port traits) and `breeze-domain` only.

mod calendar;
mod device;

pub use calendar::FixedSchedule;
pub use device::VirtualUnit;
