//! Device port — the ventilation unit behind the engine.

use std::future::Future;

use breeze_domain::error::BreezeError;
use breeze_domain::mode::Mode;

use crate::engine::TriggerInputs;
use crate::filter::SensorChannel;

/// One poll of the unit: sensor readings plus trigger input states.
#[derive(Debug, Clone, Default)]
pub struct DeviceReadings {
    /// Raw readings per monitored channel, unfiltered.
    pub sensors: Vec<(SensorChannel, f64)>,
    /// Adaptive trigger inputs as read from their entities.
    pub triggers: TriggerInputs,
}

/// A ventilation unit the engine reads from and commands.
pub trait DevicePort {
    /// Read the current sensor values and trigger inputs.
    fn poll(&self) -> impl Future<Output = Result<DeviceReadings, BreezeError>> + Send;

    /// Write an operation selection to the unit.
    fn apply_mode(&self, mode: Mode) -> impl Future<Output = Result<(), BreezeError>> + Send;
}
