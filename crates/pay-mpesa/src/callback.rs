//! # STK Callback Handling
//!
//! The gateway posts the final push result to the registered callback URL.
//! Payloads are not verified, parsed for correlation, or stored: they are
//! handed to a sink and acknowledged.

use pay_core::{CallbackAck, CallbackPayload};
use tracing::info;

/// Callback sink trait
///
/// Implement this to observe callback deliveries. Sinks cannot reject a
/// delivery.
pub trait CallbackSink: Send + Sync {
    /// Called once per delivery
    fn on_callback(&self, payload: &CallbackPayload);
}

/// Default sink (just logs payloads)
pub struct LoggingCallbackSink;

impl CallbackSink for LoggingCallbackSink {
    fn on_callback(&self, payload: &CallbackPayload) {
        match payload {
            CallbackPayload::Empty => info!("M-Pesa callback received: <empty body>"),
            CallbackPayload::Json(value) => info!("M-Pesa callback received: {}", value),
            CallbackPayload::Text(text) => info!("M-Pesa callback received (non-JSON): {}", text),
        }
    }
}

/// Hand a raw callback body to the sink and build the acknowledgement.
///
/// Always succeeds.
pub fn receive_callback(sink: &dyn CallbackSink, body: &[u8]) -> CallbackAck {
    let payload = CallbackPayload::from_bytes(body);
    sink.on_callback(&payload);
    CallbackAck::accepted()
}
