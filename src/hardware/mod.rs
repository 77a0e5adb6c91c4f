//! Hardware bridge seam between the gateway and the driver layer.
//!
//! The gateway consumes this interface only: it fetches fresh readings per
//! request or sweep tick (no caching) and forwards actuator commands without
//! observing their outcome. Command failures are logged by the driver, never
//! surfaced to the caller.

pub mod board;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use board::SimulatedBoard;

/// Health of a sensor as reported alongside its reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    On,
    Err,
}

/// A sensor value: analog sensors report numbers, the temperature sensor
/// reports a pre-formatted decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Number(f64),
    Text(String),
}

/// A fresh reading from the driver layer. Transient; the gateway never
/// caches these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub value: Option<ReadingValue>,
    pub status: SensorStatus,
    pub time: DateTime<Utc>,
}

/// Options accompanying an actuator command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandOptions {
    /// Auto-revert delay in milliseconds. When present, the actuator switches
    /// itself off after the delay; a second command for the same actuator
    /// cancels any pending revert before scheduling a new one.
    #[serde(default)]
    pub duration: Option<u64>,
}

/// Event emitted by the driver layer.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// Emitted exactly once when the board has finished initializing.
    Ready,
    /// A discrete input changed (e.g. button press = 1, release = 0).
    Sensor { name: String, value: ReadingValue },
}

/// Driver-layer interface consumed by the gateway.
///
/// Implementations address sensors by hardware name, not by the externally
/// visible sensor id.
#[async_trait]
pub trait HardwareBridge: Send + Sync {
    /// Fetch the current reading for a sensor, or `None` if the hardware
    /// name is unknown or the board has no data yet.
    async fn get_data(&self, name: &str) -> Option<Reading>;

    /// Dispatch a command to an actuator. Fire-and-forget: unrecognized
    /// actuator/command pairs are logged, never reported back.
    async fn do_command(&self, actuator: &str, cmd: &str, options: &CommandOptions);
}
