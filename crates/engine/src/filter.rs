//! Sensor stability filter — rolling-window smoothing and spike rejection.
//!
//! Each monitored channel keeps a bounded history of capacity
//! [`FILTER_CAPACITY`]. Until the history fills, readings are smoothed with
//! the running mean (initialization phase). Once full, a reading that
//! deviates from the rolling average by more than the channel's fixed
//! threshold is rejected: the average is recorded in its place and returned.

use std::collections::{HashMap, VecDeque};

/// Samples kept per channel.
pub const FILTER_CAPACITY: usize = 5;

/// The analog channels the controller monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorChannel {
    /// Relative humidity, percent.
    Humidity,
    /// Air quality (VOC), ppm.
    AirQuality,
    /// Exhaust air temperature, °C.
    Exhaust,
    /// Extract air temperature, °C.
    Extract,
    /// Supply air temperature, °C.
    Supply,
    /// Outdoor air temperature, °C.
    Outdoor,
    /// Room temperature, °C.
    Room,
}

impl SensorChannel {
    /// Every monitored channel.
    pub const ALL: [Self; 7] = [
        Self::Humidity,
        Self::AirQuality,
        Self::Exhaust,
        Self::Extract,
        Self::Supply,
        Self::Outdoor,
        Self::Room,
    ];

    /// Per-channel spike threshold: the largest accepted deviation from the
    /// rolling average. A configuration constant, not a call-time tunable.
    #[must_use]
    pub fn max_change(self) -> f64 {
        match self {
            Self::Humidity => 5.0,
            Self::AirQuality => 50.0,
            Self::Exhaust | Self::Extract | Self::Supply | Self::Outdoor | Self::Room => 2.0,
        }
    }
}

impl std::fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Humidity => f.write_str("humidity"),
            Self::AirQuality => f.write_str("air_quality"),
            Self::Exhaust => f.write_str("exhaust"),
            Self::Extract => f.write_str("extract"),
            Self::Supply => f.write_str("supply"),
            Self::Outdoor => f.write_str("outdoor"),
            Self::Room => f.write_str("room"),
        }
    }
}

/// Bounded per-channel history plus its derived rolling average.
#[derive(Debug, Default)]
struct FilterBuffer {
    samples: VecDeque<f64>,
}

impl FilterBuffer {
    fn record(&mut self, value: f64) {
        if self.samples.len() == FILTER_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    fn average(&self) -> f64 {
        let sum: f64 = self.samples.iter().sum();
        sum / self.samples.len() as f64
    }

    fn is_warm(&self) -> bool {
        self.samples.len() >= FILTER_CAPACITY
    }
}

/// Readings are reported to one decimal, matching the device's precision.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Per-device sensor filter over all monitored channels.
///
/// Owned exclusively by one [`ControlEngine`](crate::engine::ControlEngine);
/// no cross-device sharing.
#[derive(Debug)]
pub struct SensorFilter {
    buffers: HashMap<SensorChannel, FilterBuffer>,
    bypass: bool,
}

impl Default for SensorFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorFilter {
    /// Create a filter with an empty buffer registered per channel.
    #[must_use]
    pub fn new() -> Self {
        let buffers = SensorChannel::ALL
            .into_iter()
            .map(|channel| (channel, FilterBuffer::default()))
            .collect();
        Self {
            buffers,
            bypass: false,
        }
    }

    /// Globally bypass filtering (raw passthrough). History keeps being
    /// recorded so re-enabling resumes with context rather than cold.
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    /// Whether raw passthrough is active.
    #[must_use]
    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    /// Feed one raw reading and return the filtered value.
    pub fn update(&mut self, channel: SensorChannel, raw: f64) -> f64 {
        let buffer = self.buffers.entry(channel).or_default();

        if self.bypass {
            buffer.record(raw);
            return raw;
        }

        if !buffer.is_warm() {
            // Initialization phase: smooth with the running mean. The very
            // first reading is returned as itself (mean of one).
            buffer.record(raw);
            return round1(buffer.average());
        }

        let rolling_average = buffer.average();
        if (raw - rolling_average).abs() > channel.max_change() {
            // Spike: the average is recorded in place of the raw reading,
            // keeping the history aligned with what was reported.
            buffer.record(rolling_average);
            return round1(rolling_average);
        }

        buffer.record(raw);
        round1(raw)
    }

    /// Drop all history, e.g. after a device reconnect.
    pub fn reset(&mut self) {
        for buffer in self.buffers.values_mut() {
            buffer.samples.clear();
        }
    }
}
