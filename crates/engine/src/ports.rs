//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundary between the arbitration core and the outside
//! world. The engine itself is synchronous; the service drives these
//! async ports around it.

pub mod calendar;
pub mod device;

pub use calendar::CalendarSource;
pub use device::DevicePort;
