//! The portal's JSON response envelope.
//!
//! Every API answer has the shape `{"status": "success"|"error", "data": {...}, "message": "..."}`.
//! Bodies are validated on receipt; a body without a `status` key is a format error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::portal::repository::{PortalError, PortalResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: EnvelopeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseEnvelope {
    /// Parse and validate a response body.
    pub fn parse(body: &str) -> PortalResult<Self> {
        let value: Value = serde_json::from_str(body)?;
        let object = value
            .as_object()
            .ok_or_else(|| PortalError::format("Response envelope is not a JSON object"))?;

        if !object.contains_key("status") {
            return Err(PortalError::format(
                "Response envelope is missing the 'status' key",
            ));
        }

        // SkyPortal sends `data: {}` or `data: null` on some error paths
        let envelope: ResponseEnvelope = serde_json::from_value(value).map_err(|e| {
            PortalError::format(format!("Unexpected response envelope: {}", e))
        })?;
        Ok(envelope)
    }

    pub fn success(data: Option<Map<String, Value>>) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            data,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }

    /// Message text, or a placeholder when the portal sent none.
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("<no message>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_with_data() {
        let env = ResponseEnvelope::parse(
            r#"{"status": "success", "data": {"allocation_id": 7, "obj_id": "ZTF21abc"}}"#,
        )
        .unwrap();
        assert!(env.is_success());
        let data = env.data.unwrap();
        assert_eq!(data["allocation_id"], 7);
        assert!(env.message.is_none());
    }

    #[test]
    fn test_parse_error_envelope() {
        let body = r#"{"status": "error", "message": "Invalid request", "data": {}}"#;
        let env = ResponseEnvelope::parse(body).unwrap();
        assert!(!env.is_success());
        assert_eq!(env.message_or_default(), "Invalid request");
    }

    #[test]
    fn test_parse_missing_status_is_format_error() {
        let err = ResponseEnvelope::parse(r#"{"data": {}}"#).unwrap_err();
        assert!(matches!(err, PortalError::FormatError { .. }));
    }

    #[test]
    fn test_parse_unknown_status_is_format_error() {
        let err = ResponseEnvelope::parse(r#"{"status": "pending"}"#).unwrap_err();
        assert!(matches!(err, PortalError::FormatError { .. }));
    }

    #[test]
    fn test_parse_null_data() {
        let env = ResponseEnvelope::parse(r#"{"status": "error", "data": null}"#).unwrap();
        assert!(env.data.is_none());
        assert_eq!(env.message_or_default(), "<no message>");
    }

    #[test]
    fn test_parse_non_object() {
        assert!(ResponseEnvelope::parse("[1, 2]").is_err());
        assert!(ResponseEnvelope::parse("<html>502</html>").is_err());
    }
}
