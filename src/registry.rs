//! Static registry of addressable sensors and actuators.
//!
//! The registry is built once at startup and never mutated. Sensor ids are
//! URL-safe strings exposed to the controller; hardware names address the
//! driver layer and are never exposed.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Semantic type of a sensor or actuator, as advertised to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SensorKind {
    Noise,
    Light,
    RotaryAngle,
    Temperature,
    PowerSwitch,
    OnOff,
}

/// Immutable descriptor for a single sensor or actuator.
///
/// Wire field names match the discovery response consumed by the controller:
/// `type` carries the semantic kind and `name` the internal hardware name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SensorKind,
    #[serde(rename = "name")]
    pub hardware_name: String,
    #[serde(rename = "notification")]
    pub default_notify: bool,
}

/// Groups sensor descriptors under a device address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub device_address: String,
    pub sensors: Vec<SensorDescriptor>,
}

/// Ordered, read-only collection of device descriptors with first-match
/// lookups. "Not found" is a normal outcome (`None`), never an error.
#[derive(Debug, Clone)]
pub struct SensorRegistry {
    devices: Vec<DeviceDescriptor>,
}

impl SensorRegistry {
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self { devices }
    }

    /// The Grove starter-kit board layout: four polled series sensors, three
    /// switchable actuators and two event inputs under device address "0".
    pub fn grove_kit() -> Self {
        let device_address = "0".to_string();
        let sensor = |suffix: &str, kind, hardware_name: &str, default_notify| SensorDescriptor {
            id: format!("{device_address}-{suffix}"),
            kind,
            hardware_name: hardware_name.to_string(),
            default_notify,
        };

        Self::new(vec![DeviceDescriptor {
            device_address: device_address.clone(),
            sensors: vec![
                // Analog series
                sensor("sound", SensorKind::Noise, "sound", false),
                sensor("light", SensorKind::Light, "light", false),
                sensor("rotary", SensorKind::RotaryAngle, "rotary", false),
                sensor("temp", SensorKind::Temperature, "temperature", false),
                // Digital actuators
                sensor("buzz", SensorKind::PowerSwitch, "buzzer", false),
                sensor("led", SensorKind::PowerSwitch, "led", false),
                sensor("relay", SensorKind::PowerSwitch, "relay", false),
                // Event inputs
                sensor("button", SensorKind::OnOff, "button", true),
                sensor("touch", SensorKind::OnOff, "touch", true),
            ],
        }])
    }

    /// All devices in declaration order, used for discovery responses.
    pub fn devices(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    /// First descriptor whose id matches, in declaration order.
    pub fn lookup_by_id(&self, id: &str) -> Option<&SensorDescriptor> {
        self.iter().find(|s| s.id == id)
    }

    /// First descriptor whose hardware name matches, in declaration order.
    pub fn lookup_by_hardware_name(&self, name: &str) -> Option<&SensorDescriptor> {
        self.iter().find(|s| s.hardware_name == name)
    }

    fn iter(&self) -> impl Iterator<Item = &SensorDescriptor> {
        self.devices.iter().flat_map(|d| d.sensors.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id() {
        let registry = SensorRegistry::grove_kit();
        let led = registry.lookup_by_id("0-led").unwrap();
        assert_eq!(led.hardware_name, "led");
        assert_eq!(led.kind, SensorKind::PowerSwitch);
        assert!(!led.default_notify);

        assert!(registry.lookup_by_id("0-missing").is_none());
    }

    #[test]
    fn test_lookup_by_hardware_name() {
        let registry = SensorRegistry::grove_kit();
        let temp = registry.lookup_by_hardware_name("temperature").unwrap();
        // The temperature sensor id differs from its hardware name
        assert_eq!(temp.id, "0-temp");

        assert!(registry.lookup_by_hardware_name("missing").is_none());
    }

    #[test]
    fn test_first_match_wins_on_duplicates() {
        let registry = SensorRegistry::new(vec![DeviceDescriptor {
            device_address: "0".to_string(),
            sensors: vec![
                SensorDescriptor {
                    id: "0-dup".to_string(),
                    kind: SensorKind::Light,
                    hardware_name: "first".to_string(),
                    default_notify: false,
                },
                SensorDescriptor {
                    id: "0-dup".to_string(),
                    kind: SensorKind::Noise,
                    hardware_name: "second".to_string(),
                    default_notify: false,
                },
            ],
        }]);

        let found = registry.lookup_by_id("0-dup").unwrap();
        assert_eq!(found.hardware_name, "first");
    }

    #[test]
    fn test_event_inputs_default_to_notify() {
        let registry = SensorRegistry::grove_kit();
        assert!(registry.lookup_by_id("0-button").unwrap().default_notify);
        assert!(registry.lookup_by_id("0-touch").unwrap().default_notify);
    }

    #[test]
    fn test_discovery_wire_shape() {
        let registry = SensorRegistry::grove_kit();
        let json = serde_json::to_value(registry.devices()).unwrap();
        let device = &json[0];
        assert_eq!(device["deviceAddress"], "0");

        let first = &device["sensors"][0];
        assert_eq!(first["id"], "0-sound");
        assert_eq!(first["type"], "noise");
        assert_eq!(first["name"], "sound");
        assert_eq!(first["notification"], false);

        let rotary = &device["sensors"][2];
        assert_eq!(rotary["type"], "rotaryAngle");
    }
}
