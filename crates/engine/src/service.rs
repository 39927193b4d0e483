//! Control service — drives the engine against the device and calendar
//! ports.

use breeze_domain::error::BreezeError;
use breeze_domain::mode::Mode;
use breeze_domain::time::Timestamp;

use crate::config::EngineConfig;
use crate::engine::{ControlEngine, TickInput, TickOutcome};
use crate::ports::{CalendarSource, DevicePort};

/// Application service running one engine against one ventilation unit.
pub struct ControlService<D, C> {
    device: D,
    calendar: C,
    engine: ControlEngine,
}

impl<D: DevicePort, C: CalendarSource> ControlService<D, C> {
    /// Create a service for the given ports.
    pub fn new(config: EngineConfig, device: D, calendar: C) -> Self {
        Self {
            device,
            calendar,
            engine: ControlEngine::new(config),
        }
    }

    /// The device port behind this service.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The calendar port behind this service.
    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Queue a direct user override for the next tick.
    pub fn request_manual(&mut self, mode: Mode) {
        self.engine.request_manual(mode);
    }

    /// Toggle the sensor stability filter.
    pub fn set_filtering(&mut self, enabled: bool) {
        self.engine.set_filtering(enabled);
    }

    /// Poll the ports, run one evaluation tick, and push any resulting
    /// command to the device.
    ///
    /// # Errors
    ///
    /// Returns [`BreezeError::Device`] when polling or commanding the
    /// unit fails, or [`BreezeError::Calendar`] when the schedule cannot
    /// be read.
    pub async fn run_once(&mut self, now: Timestamp) -> Result<TickOutcome, BreezeError> {
        let readings = self.device.poll().await?;
        let calendar = self.calendar.open_events(now).await?;
        let outcome = self.engine.tick(TickInput {
            now,
            sensors: readings.sensors,
            triggers: readings.triggers,
            calendar,
        });
        for fault in &outcome.faults {
            tracing::warn!(%fault, "degraded tick");
        }
        if let Some(mode) = outcome.command {
            self.device.apply_mode(mode).await?;
        }
        Ok(outcome)
    }

    /// Tear the engine down: pending cooldowns and revert entries are
    /// released before the service is dropped.
    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }
}
