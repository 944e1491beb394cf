//! # pay-core
//!
//! Core types and traits for the M-Pesa push payment backend.
//!
//! This crate provides:
//! - `PaymentGateway` trait for gateway clients
//! - `Timestamp`, `stk_password` and `StkPushRequest` for the push request
//! - `CallbackAck` and `CallbackPayload` for the asynchronous result callback
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{PaymentGateway, Timestamp, stk_password};
//!
//! let ts = Timestamp::now();
//! let password = stk_password("174379", &passkey, &ts);
//!
//! // Or let a gateway do the whole flow
//! let ack = gateway.initiate_push(&json!("254708374149"), &json!(10)).await?;
//! ```

pub mod callback;
pub mod error;
pub mod gateway;
pub mod stk;

// Re-exports for convenience
pub use callback::{CallbackAck, CallbackPayload};
pub use error::{PaymentError, PaymentResult};
pub use gateway::{BoxedPaymentGateway, PaymentGateway};
pub use stk::{stk_password, AccessToken, PushDefaults, StkPushRequest, Timestamp, TransactionType};
