//! Bridges board events and the periodic status sweep into push
//! notifications.
//!
//! Both producers gate every push on the same two conditions: an active
//! connection and an enabled subscription for the sensor id. There is no
//! queuing; a push that cannot be delivered is dropped.

use super::GatewayContext;
use crate::hardware::{BoardEvent, SensorStatus};
use crate::rpc::codec::Notification;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};

/// Consume the board event channel for the lifetime of the process.
///
/// The one-time `Ready` event starts the status sweep and opens the event
/// path; `Sensor` events arriving before readiness are dropped. After that
/// they are translated into value notifications in arrival order, no
/// batching.
pub fn spawn_event_bridge(
    ctx: Arc<GatewayContext>,
    mut events: mpsc::Receiver<BoardEvent>,
    sweep_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // The sweep handle doubles as the readiness marker
        let mut sweep: Option<JoinHandle<()>> = None;
        while let Some(event) = events.recv().await {
            match event {
                BoardEvent::Ready => {
                    if sweep.is_none() {
                        info!("[Gateway] board ready, starting status sweep");
                        sweep = Some(spawn_status_sweep(ctx.clone(), sweep_interval));
                    }
                }
                BoardEvent::Sensor { name, value } => {
                    if sweep.is_none() {
                        debug!("[Gateway] event before board ready dropped name={}", name);
                        continue;
                    }
                    // An unknown hardware name resolves to an empty id; the
                    // push still goes through the same subscription gate.
                    let id = ctx
                        .registry()
                        .lookup_by_hardware_name(&name)
                        .map(|s| s.id.clone())
                        .unwrap_or_default();
                    if !ctx.is_connected() || !ctx.is_subscribed(&id) {
                        continue;
                    }
                    ctx.push(Notification::value(id, value));
                }
            }
        }
    })
}

/// Push a status-only notification for every subscribed sensor on a fixed
/// period, in declaration order. Runs for the lifetime of the process; while
/// no connection is active the sweep produces nothing.
pub fn spawn_status_sweep(ctx: Arc<GatewayContext>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        // interval fires immediately; the first sweep belongs one period out
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sweep_once(&ctx).await;
        }
    })
}

async fn sweep_once(ctx: &GatewayContext) {
    for device in ctx.registry().devices() {
        for sensor in &device.sensors {
            if !ctx.is_connected() || !ctx.is_subscribed(&sensor.id) {
                continue;
            }
            let status = match ctx.bridge().get_data(&sensor.hardware_name).await {
                Some(reading) => reading.status,
                None => SensorStatus::Err,
            };
            ctx.push(Notification::status(sensor.id.clone(), status));
        }
    }
}
