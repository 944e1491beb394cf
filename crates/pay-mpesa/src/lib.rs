//! # pay-mpesa
//!
//! M-Pesa (Safaricom Daraja) gateway for mpesa-push-rs.
//!
//! This crate provides:
//!
//! 1. **DarajaClient** - `PaymentGateway` over the Daraja API
//!    - OAuth token with Basic credentials, fetched per push
//!    - STK push with timestamp-derived password
//!
//! 2. **CallbackSink** - receiver side of the asynchronous result callback
//!    - `LoggingCallbackSink` logs every delivery
//!    - `receive_callback` always acknowledges
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_mpesa::DarajaClient;
//! use pay_core::PaymentGateway;
//!
//! // Create client from environment
//! let client = DarajaClient::from_env()?;
//!
//! // Prompt the customer's phone
//! let ack = client.initiate_push(&json!("254708374149"), &json!(1)).await?;
//! ```
//!
//! ## Callback Handling
//!
//! ```rust,ignore
//! use pay_mpesa::{receive_callback, LoggingCallbackSink};
//!
//! // In your callback endpoint:
//! let ack = receive_callback(&LoggingCallbackSink, &body);
//! ```

pub mod callback;
pub mod config;
pub mod daraja;

// Re-exports
pub use callback::{receive_callback, CallbackSink, LoggingCallbackSink};
pub use config::{MpesaConfig, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
pub use daraja::DarajaClient;
