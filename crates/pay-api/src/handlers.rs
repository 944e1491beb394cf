//! # Request Handlers
//!
//! Axum request handlers for the M-Pesa API.
//! Every upstream failure is reported to the caller as a generic 500.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pay_core::{CallbackAck, PaymentError};
use pay_mpesa::receive_callback;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

/// Static liveness string served at `/`
pub const LIVENESS_MESSAGE: &str = "M-Pesa Backend is Running";

/// Client-facing message when the token endpoint fails
pub const TOKEN_FAILED_MESSAGE: &str = "Failed to get token";

/// Client-facing message when the push flow fails
pub const PUSH_FAILED_MESSAGE: &str = "STK Push failed";

// =============================================================================
// Request/Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Convert a gateway error into the generic client-facing body
fn payment_error_to_response(
    state: &AppState,
    message: &str,
    err: PaymentError,
) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let mut response = ErrorResponse::new(message, code);
    if state.config.expose_upstream_errors {
        response = response.with_details(err.to_string());
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Liveness endpoint
pub async fn root() -> &'static str {
    LIVENESS_MESSAGE
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "mpesa-push",
        "provider": state.gateway.provider_name(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Fetch an access token and return the gateway's body as-is
#[instrument(skip(state))]
pub async fn get_token(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorResponse>)> {
    let body = state.gateway.request_token().await.map_err(|e| {
        error!("Failed to get token: {}", e);
        payment_error_to_response(&state, TOKEN_FAILED_MESSAGE, e)
    })?;

    Ok(Json(body))
}

/// Pull one caller field out of the push body, `Null` when absent
fn body_field(body: &Value, key: &str) -> Value {
    body.get(key).cloned().unwrap_or(Value::Null)
}

/// Initiate an STK push and return the gateway's acknowledgement as-is
///
/// `phone` and `amount` are forwarded exactly as received; the gateway
/// judges them. A body that is not JSON fails like any other push.
#[instrument(skip(state, payload))]
pub async fn stk_push(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorResponse>)> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Unreadable STK push body: {}", rejection);
            let err = PaymentError::Internal(format!("invalid request body: {}", rejection));
            return Err(payment_error_to_response(&state, PUSH_FAILED_MESSAGE, err));
        }
    };

    let phone = body_field(&body, "phone");
    let amount = body_field(&body, "amount");
    info!(amount = %amount, "STK push requested");

    // Runs detached so a caller disconnect does not abort in-flight calls
    let gateway = state.gateway.clone();
    let task = tokio::spawn(async move { gateway.initiate_push(&phone, &amount).await });

    let result = match task.await {
        Ok(result) => result,
        Err(e) => Err(PaymentError::Internal(format!("push task failed: {}", e))),
    };

    let ack = result.map_err(|e| {
        error!("STK push failed: {}", e);
        payment_error_to_response(&state, PUSH_FAILED_MESSAGE, e)
    })?;

    Ok(Json(ack))
}

/// Receive the gateway's result callback. Always acknowledged.
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn mpesa_callback(State(state): State<AppState>, body: Bytes) -> Json<CallbackAck> {
    Json(receive_callback(state.callbacks.as_ref(), &body))
}
