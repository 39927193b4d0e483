//! Virtual ventilation unit — scripted readings, recorded commands.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use breeze_domain::error::BreezeError;
use breeze_domain::mode::Mode;
use breeze_domain::trigger::TriggerKind;
use breeze_engine::engine::TriggerInputs;
use breeze_engine::filter::SensorChannel;
use breeze_engine::ports::device::{DevicePort, DeviceReadings};

struct UnitState {
    sensors: Vec<(SensorChannel, f64)>,
    triggers: TriggerInputs,
    commanded: Vec<Mode>,
}

/// A simulated unit whose readings are scripted by the test or demo
/// driving it. Every mode command is recorded in order.
pub struct VirtualUnit {
    state: Mutex<UnitState>,
}

impl Default for VirtualUnit {
    fn default() -> Self {
        Self {
            state: Mutex::new(UnitState {
                sensors: Vec::new(),
                triggers: TriggerInputs::inactive(),
                commanded: Vec::new(),
            }),
        }
    }
}

impl VirtualUnit {
    /// Script a sensor reading; replaces any previous value for the channel.
    pub fn set_sensor(&self, channel: SensorChannel, value: f64) {
        let mut state = self.lock();
        if let Some(slot) = state.sensors.iter_mut().find(|(c, _)| *c == channel) {
            slot.1 = value;
        } else {
            state.sensors.push((channel, value));
        }
    }

    /// Script a trigger input. `None` simulates a broken input entity.
    pub fn set_trigger_input(&self, kind: TriggerKind, input: Option<bool>) {
        let mut state = self.lock();
        match kind {
            TriggerKind::Boost => state.triggers.boost = input,
            TriggerKind::Eco => state.triggers.eco = input,
            TriggerKind::Home => state.triggers.home = input,
        }
    }

    /// Every mode commanded so far, oldest first.
    #[must_use]
    pub fn commanded_modes(&self) -> Vec<Mode> {
        self.lock().commanded.clone()
    }

    /// The most recently commanded mode, if any.
    #[must_use]
    pub fn current_mode(&self) -> Option<Mode> {
        self.lock().commanded.last().copied()
    }

    fn lock(&self) -> MutexGuard<'_, UnitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DevicePort for VirtualUnit {
    fn poll(&self) -> impl Future<Output = Result<DeviceReadings, BreezeError>> + Send {
        let state = self.lock();
        let readings = DeviceReadings {
            sensors: state.sensors.clone(),
            triggers: state.triggers,
        };
        async { Ok(readings) }
    }

    fn apply_mode(&self, mode: Mode) -> impl Future<Output = Result<(), BreezeError>> + Send {
        self.lock().commanded.push(mode);
        async { Ok(()) }
    }
}
