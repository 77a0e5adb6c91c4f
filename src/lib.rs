//! Sensor gateway library.
//!
//! This library bridges the physical sensors and actuators of a single board
//! to a remote controller over a JSON-RPC connection, translating board
//! events and periodic status polls into push notifications and inbound
//! requests into reads and actuator commands.

pub mod config;
pub mod error;
pub mod gateway;
pub mod hardware;
pub mod registry;
pub mod rpc;
