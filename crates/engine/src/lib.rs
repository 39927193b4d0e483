//! # breeze-engine
//!
//! The mode arbitration & scheduling engine and its **port definitions**.
//!
//! ## Responsibilities
//! - **`SensorFilter`** — rolling-window smoothing and spike rejection for
//!   noisy analog channels
//! - **`TriggerTimer`** — one Idle/Active/CoolingDown state machine per
//!   adaptive trigger kind, with hysteresis timeouts and revert snapshots
//! - **`CalendarResolver`** — diffs the open-event set, maps keywords to
//!   priority-tagged candidates, and maintains the revert stack
//! - **`arbitrate`** — pure reduction of a tick's candidate list to one
//!   winning mode
//! - **`ControlEngine`** — per-tick orchestration of all of the above for a
//!   single managed device
//! - Define **port traits** adapters implement: [`ports::DevicePort`],
//!   [`ports::CalendarSource`]
//! - [`service::ControlService`] — drives one full tick against the ports
//!
//! ## Dependency rule
//! Depends on `breeze-domain` only. Never imports adapter crates; adapters
//! depend on *this* crate, not the reverse. The engine itself performs no
//! IO — suspension only happens in `ControlService` at the port calls.

pub mod arbiter;
pub mod calendar_resolver;
pub mod config;
pub mod engine;
pub mod filter;
pub mod ports;
pub mod revert_stack;
pub mod service;
pub mod trigger_timer;
