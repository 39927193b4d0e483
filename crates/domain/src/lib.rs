//! # breeze-domain
//!
//! Pure domain model for the breeze ventilation controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Modes** (the operating intents a ventilation unit understands)
//! - Define **Candidates** (a proposed mode, its priority, and its origin,
//!   competing for the device each evaluation tick)
//! - Define the **calendar vocabulary** (event keywords and the fixed
//!   priority table that orders them)
//! - Define **adaptive triggers** (Boost/Eco/Home kinds and their phases)
//! - Define the **adaptive state** readout exposed for observability
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from the engine, adapters, or IO crates.
//! All IO boundaries are expressed as traits in the `engine` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod adaptive;
pub mod calendar;
pub mod candidate;
pub mod mode;
pub mod trigger;
