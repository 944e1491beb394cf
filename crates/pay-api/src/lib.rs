//! # pay-api
//!
//! HTTP API layer for mpesa-push-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - STK push and token endpoints backed by a `PaymentGateway`
//! - The callback receiver for payment results
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Liveness string |
//! | GET | `/health` | Health check |
//! | GET | `/token` | Access token passthrough |
//! | POST | `/stkpush` | Initiate STK push |
//! | POST | `/callback` | M-Pesa result callback |
//!
//! The last three are also served under `/api/mpesa`.

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
