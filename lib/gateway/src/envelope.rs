//! The wire payload shape shared by every backend endpoint.
//!
//! All responses arrive as `{ code, message?, data? }`. The application code
//! is authoritative: a call succeeds only when the transport succeeded AND
//! `code == 200`, so callers must never trust the transport status alone.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::GatewayError;

/// The only application code that means success.
pub const SUCCESS_CODE: i64 = 200;

/// A decoded response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Application status code.
    pub code: i64,
    /// Human-readable message, when the backend supplies one.
    #[serde(default)]
    pub message: Option<String>,
    /// Endpoint-specific payload.
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Returns true if the application code signals success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Deserializes the `data` field into a typed payload.
    ///
    /// A missing `data` field deserializes as JSON `null`, so optional
    /// payloads decode to `None` and unit payloads to `()`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Unknown` when the payload does not match the
    /// expected shape.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        let value = self.data.clone().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|err| GatewayError::Unknown {
            code: self.code,
            message: Some(format!("unexpected response payload: {err}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_code_200() {
        let envelope: Envelope = serde_json::from_str(r#"{"code": 200}"#).expect("deserialize");
        assert!(envelope.is_success());

        let envelope: Envelope =
            serde_json::from_str(r#"{"code": 500, "message": "boom"}"#).expect("deserialize");
        assert!(!envelope.is_success());
    }

    #[test]
    fn data_decodes_into_typed_payload() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Payload {
            value: i32,
        }

        let envelope: Envelope =
            serde_json::from_str(r#"{"code": 200, "data": {"value": 7}}"#).expect("deserialize");
        let payload: Payload = envelope.data_as().expect("decode data");
        assert_eq!(payload, Payload { value: 7 });
    }

    #[test]
    fn missing_data_decodes_as_none() {
        let envelope: Envelope = serde_json::from_str(r#"{"code": 200}"#).expect("deserialize");
        let payload: Option<i32> = envelope.data_as().expect("decode data");
        assert!(payload.is_none());
    }

    #[test]
    fn mismatched_data_is_an_unknown_error() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"code": 200, "data": "oops"}"#).expect("deserialize");
        let err = envelope.data_as::<Vec<i32>>().expect_err("should not decode");
        assert!(matches!(err, GatewayError::Unknown { code: 200, .. }));
    }
}
