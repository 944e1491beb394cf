//! # Callback Types
//!
//! The gateway posts the final result of a push to the registered callback
//! URL. The payload is opaque here; every delivery gets the same
//! acknowledgement.

use serde::{Deserialize, Serialize};

/// Acknowledgement returned for every callback delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackAck {
    #[serde(rename = "ResultCode")]
    pub result_code: i32,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
    pub message: String,
}

impl CallbackAck {
    /// The only acknowledgement ever sent: accepted
    pub fn accepted() -> Self {
        Self {
            result_code: 0,
            result_desc: "Accepted".to_string(),
            message: "Callback received successfully".to_string(),
        }
    }
}

/// A callback body as received, before any interpretation
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackPayload {
    /// Empty request body
    Empty,
    /// Body parsed as JSON
    Json(serde_json::Value),
    /// Body that is not JSON, kept as lossy UTF-8
    Text(String),
}

impl CallbackPayload {
    /// Classify raw body bytes. Never fails.
    pub fn from_bytes(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return CallbackPayload::Empty;
        }
        match serde_json::from_slice(body) {
            Ok(value) => CallbackPayload::Json(value),
            Err(_) => CallbackPayload::Text(String::from_utf8_lossy(body).into_owned()),
        }
    }
}
