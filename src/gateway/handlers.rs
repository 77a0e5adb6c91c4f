//! Inbound request handlers.
//!
//! Unknown sensor ids are handled permissively throughout: lookups that fail
//! resolve to an empty hardware name and the call proceeds, reporting absence
//! of data rather than an error. Command dispatch is fire-and-forget.

use super::GatewayContext;
use crate::hardware::{CommandOptions, ReadingValue, SensorStatus};
use crate::registry::DeviceDescriptor;
use log::info;
use serde::Serialize;

/// Result of a `sensor.get` call. `value` is null while the board has no
/// data yet; that is a normal, representable state, not a failed call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingResult {
    pub value: Option<ReadingValue>,
    pub status: SensorStatus,
}

impl GatewayContext {
    /// Full static registry for the `discover` call. Always succeeds.
    pub fn discover(&self) -> &[DeviceDescriptor] {
        self.registry().devices()
    }

    /// Resolve an id and fetch a fresh reading from the hardware bridge.
    pub async fn get_reading(&self, id: &str) -> ReadingResult {
        let hardware_name = self
            .registry()
            .lookup_by_id(id)
            .map(|s| s.hardware_name.clone())
            .unwrap_or_default();

        match self.bridge().get_data(&hardware_name).await {
            Some(reading) => ReadingResult {
                value: reading.value,
                status: reading.status,
            },
            None => ReadingResult {
                value: None,
                status: SensorStatus::Err,
            },
        }
    }

    /// Forward an actuator command to the hardware bridge. Always succeeds
    /// from the caller's point of view; hardware-level failures are logged by
    /// the driver.
    pub async fn dispatch_command(&self, id: &str, cmd: &str, options: &CommandOptions) {
        info!(
            "[Gateway] set actuator id={} cmd={} options={:?}",
            id, cmd, options
        );
        let hardware_name = self
            .registry()
            .lookup_by_id(id)
            .map(|s| s.hardware_name.clone())
            .unwrap_or_default();
        self.bridge().do_command(&hardware_name, cmd, options).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::SimulatedBoard;
    use crate::registry::SensorRegistry;
    use std::sync::Arc;

    fn context() -> (GatewayContext, SimulatedBoard) {
        let (board, _events) = SimulatedBoard::new();
        let ctx = GatewayContext::new(SensorRegistry::grove_kit(), Arc::new(board.clone()));
        (ctx, board)
    }

    #[tokio::test]
    async fn test_get_reading_without_data_reports_err() {
        let (ctx, _board) = context();
        let result = ctx.get_reading("0-temp").await;
        assert_eq!(result.value, None);
        assert_eq!(result.status, SensorStatus::Err);
    }

    #[tokio::test]
    async fn test_get_reading_unknown_id_reports_err() {
        let (ctx, _board) = context();
        let result = ctx.get_reading("0-missing").await;
        assert_eq!(result.value, None);
        assert_eq!(result.status, SensorStatus::Err);
    }

    #[tokio::test]
    async fn test_command_then_read_round_trip() {
        let (ctx, _board) = context();
        ctx.dispatch_command("0-led", "on", &CommandOptions::default())
            .await;

        let result = ctx.get_reading("0-led").await;
        assert_eq!(result.value, Some(ReadingValue::Number(1.0)));
        assert_eq!(result.status, SensorStatus::On);
    }

    #[tokio::test]
    async fn test_command_for_unknown_id_is_swallowed() {
        let (ctx, _board) = context();
        // Resolves to an empty hardware name; the driver logs and ignores it
        ctx.dispatch_command("0-missing", "on", &CommandOptions::default())
            .await;
    }

    #[tokio::test]
    async fn test_discover_is_idempotent() {
        let (ctx, _board) = context();
        let first = serde_json::to_value(ctx.discover()).unwrap();
        ctx.enable_notification("0-button");
        let second = serde_json::to_value(ctx.discover()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0]["sensors"].as_array().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_enable_notification_accepts_unknown_id() {
        let (ctx, _board) = context();
        ctx.enable_notification("not-a-sensor");
        assert!(ctx.is_subscribed("not-a-sensor"));
    }
}
