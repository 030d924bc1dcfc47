//! Capability interface of the remote simulator the session is driven against.

use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use thiserror::Error;

use crate::core::snapshot::BatterySnapshot;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The state or a profile could not be read or parsed.
    #[error("telemetry is unavailable: {0}")]
    TelemetryUnavailable(#[source] BoxedError),

    /// A charger command was not acknowledged.
    #[error("control is unavailable: {0}")]
    ControlUnavailable(#[source] BoxedError),
}

/// Simulated time of day.
#[derive(Copy, Clone, PartialEq)]
pub struct SimulatedTime {
    /// Hour of day, `0..24`.
    pub hour: u32,

    /// Minute within the hour, `0.0..60.0`.
    pub minute: f64,
}

impl Debug for SimulatedTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02.0}", self.hour, self.minute)
    }
}

#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct Reading {
    pub time: SimulatedTime,
    pub battery: BatterySnapshot,
}

#[async_trait]
pub trait Telemetry: Sync {
    async fn get_current_state(&self) -> Result<Reading, TelemetryError>;

    /// Raw household load per hour of day, in kilowatts.
    async fn get_hourly_load_profile(&self) -> Result<Vec<f64>, TelemetryError>;

    /// Raw energy rate per hour of day.
    async fn get_hourly_price_profile(&self) -> Result<Vec<f64>, TelemetryError>;

    async fn start_charging(&self) -> Result<String, TelemetryError>;

    async fn stop_charging(&self) -> Result<String, TelemetryError>;
}
