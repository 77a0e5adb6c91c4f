//! Wire types for the newline-delimited JSON-RPC connection.
//!
//! Requests carry an id the response echoes back; push notifications are
//! server-initiated and carry no id. Event-driven pushes carry a `value`
//! body, periodic status pushes a `status` body.

use crate::hardware::{ReadingValue, SensorStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NOTIFICATION_METHOD: &str = "sensor.notification";

/// Inbound method call from the controller.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

/// Response to a single request.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub id: Value,
    pub result: Value,
    pub error: Option<String>,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            result,
            error: None,
        }
    }

    pub fn error(id: Value, message: impl Into<String>) -> Self {
        Self {
            id,
            result: Value::Null,
            error: Some(message.into()),
        }
    }
}

/// Server-initiated push to the connected controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub method: String,
    /// Positional params: `[sensor id, body]`.
    pub params: (String, NotificationBody),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NotificationBody {
    Value { value: ReadingValue },
    Status { status: SensorStatus },
}

impl Notification {
    /// Event-driven push carrying the new value.
    pub fn value(id: impl Into<String>, value: ReadingValue) -> Self {
        Self {
            method: NOTIFICATION_METHOD.to_string(),
            params: (id.into(), NotificationBody::Value { value }),
        }
    }

    /// Periodic status push; intentionally carries no value.
    pub fn status(id: impl Into<String>, status: SensorStatus) -> Self {
        Self {
            method: NOTIFICATION_METHOD.to_string(),
            params: (id.into(), NotificationBody::Status { status }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_request() {
        let request: Request =
            serde_json::from_str(r#"{"id":7,"method":"sensor.get","params":["0-temp"]}"#).unwrap();
        assert_eq!(request.id, json!(7));
        assert_eq!(request.method, "sensor.get");
        assert_eq!(request.params, vec![json!("0-temp")]);
    }

    #[test]
    fn test_parse_request_without_params() {
        let request: Request =
            serde_json::from_str(r#"{"id":"a","method":"discover"}"#).unwrap();
        assert!(request.params.is_empty());
    }

    #[test]
    fn test_response_success_has_null_error() {
        let response = Response::success(json!(1), json!("success"));
        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire, json!({"id": 1, "result": "success", "error": null}));
    }

    #[test]
    fn test_value_notification_wire_shape() {
        let notification = Notification::value("0-button", ReadingValue::Number(1.0));
        let wire = serde_json::to_value(&notification).unwrap();
        assert_eq!(
            wire,
            json!({
                "method": "sensor.notification",
                "params": ["0-button", {"value": 1.0}]
            })
        );
    }

    #[test]
    fn test_status_notification_omits_value() {
        let notification = Notification::status("0-temp", SensorStatus::Err);
        let wire = serde_json::to_value(&notification).unwrap();
        assert_eq!(
            wire,
            json!({
                "method": "sensor.notification",
                "params": ["0-temp", {"status": "err"}]
            })
        );
    }
}
