//! Notification gateway core.
//!
//! The [`GatewayContext`] is constructed once at startup and passed to every
//! collaborator: it owns the sensor registry, the hardware bridge handle and
//! the mutable subscription/connection state. All mutation goes through the
//! context, which serializes access with a single lock, so the request
//! handlers, the hardware event bridge and the periodic sweep can never race
//! on the subscription table or the connection slot.

pub mod bridge;
pub mod handlers;
mod state;

use crate::hardware::HardwareBridge;
use crate::registry::SensorRegistry;
use crate::rpc::codec::Notification;
use log::warn;
use parking_lot::Mutex;
use state::GatewayState;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

pub struct GatewayContext {
    registry: SensorRegistry,
    bridge: Arc<dyn HardwareBridge>,
    state: Mutex<GatewayState>,
    next_conn_id: AtomicU64,
}

impl GatewayContext {
    pub fn new(registry: SensorRegistry, bridge: Arc<dyn HardwareBridge>) -> Self {
        Self {
            registry,
            bridge,
            state: Mutex::new(GatewayState::new()),
            next_conn_id: AtomicU64::new(1),
        }
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn bridge(&self) -> &Arc<dyn HardwareBridge> {
        &self.bridge
    }

    /// Install an outbound notification channel for a new controller
    /// connection and return its connection id. Any previous occupant of the
    /// slot is silently replaced; its subscriptions stay in place.
    pub fn register_connection(&self, tx: mpsc::UnboundedSender<Notification>) -> u64 {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        self.state.lock().connect(conn_id, tx);
        conn_id
    }

    /// Tear down a connection on error or close. When the closing connection
    /// still occupies the slot, every subscription is reset.
    pub fn drop_connection(&self, conn_id: u64) {
        if self.state.lock().disconnect(conn_id) {
            warn!("[Gateway] connection closed, all notifications disabled");
        }
    }

    pub fn enable_notification(&self, id: &str) {
        self.state.lock().enable_notification(id);
    }

    pub fn is_subscribed(&self, id: &str) -> bool {
        self.state.lock().is_subscribed(id)
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().is_connected()
    }

    /// Best-effort push to the active connection; dropped silently when no
    /// connection is active or delivery fails.
    pub fn push(&self, notification: Notification) {
        self.state.lock().push(notification);
    }
}
