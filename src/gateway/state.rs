//! Subscription table and connection slot.
//!
//! Both live behind a single lock owned by the gateway context, so every
//! mutation from the request handlers, the event bridge and the sweep is
//! serialized. Invariants:
//!
//! - The subscription table maps sensor id to "push notifications enabled";
//!   absence is equivalent to `false`. Entries are set only by an enable
//!   request and reset (not removed) when the active connection is lost.
//! - The connection slot holds at most one outbound channel. A new connection
//!   silently replaces the previous occupant without touching the table; only
//!   the close of the *current* occupant resets it.

use crate::rpc::codec::Notification;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Outbound notification channel for the active controller connection.
#[derive(Debug)]
pub struct NotificationSink {
    conn_id: u64,
    tx: mpsc::UnboundedSender<Notification>,
}

#[derive(Debug, Default)]
pub(crate) struct GatewayState {
    subscriptions: HashMap<String, bool>,
    connection: Option<NotificationSink>,
}

impl GatewayState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Install a new connection, replacing any previous occupant. The
    /// subscription table is deliberately left untouched.
    pub(crate) fn connect(&mut self, conn_id: u64, tx: mpsc::UnboundedSender<Notification>) {
        self.connection = Some(NotificationSink { conn_id, tx });
    }

    /// Tear down a connection by id. Returns `true` when the closing
    /// connection was still the occupant, in which case every subscription
    /// entry has been forced back to `false`.
    ///
    /// A stale id (a connection that was already replaced) is a no-op so a
    /// superseded connection's teardown cannot disturb its successor.
    pub(crate) fn disconnect(&mut self, conn_id: u64) -> bool {
        match &self.connection {
            Some(sink) if sink.conn_id == conn_id => {
                self.connection = None;
                for enabled in self.subscriptions.values_mut() {
                    *enabled = false;
                }
                true
            }
            _ => false,
        }
    }

    /// Idempotently enable notifications for a sensor id. The id is not
    /// validated against the registry.
    pub(crate) fn enable_notification(&mut self, id: &str) {
        if !self.subscriptions.get(id).copied().unwrap_or(false) {
            self.subscriptions.insert(id.to_string(), true);
        }
    }

    pub(crate) fn is_subscribed(&self, id: &str) -> bool {
        self.subscriptions.get(id).copied().unwrap_or(false)
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Best-effort push: dropped silently when no connection is active or the
    /// channel is gone. Failure is unobservable to callers by design.
    pub(crate) fn push(&self, notification: Notification) {
        if let Some(sink) = &self.connection {
            let _ = sink.tx.send(notification);
        }
    }
}
