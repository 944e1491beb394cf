//! # Payment Gateway Trait
//!
//! The seam between the HTTP layer and a mobile-money gateway.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  PaymentGateway (trait)                     │
//! │  ├── request_token()                                        │
//! │  ├── acquire_access_token()                                 │
//! │  ├── initiate_push()                                        │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │ DarajaClient  │
//!                    │  (pay-mpesa)  │
//!                    └───────────────┘
//! ```

use crate::error::{PaymentError, PaymentResult};
use crate::stk::AccessToken;
use async_trait::async_trait;
use std::sync::Arc;

/// Operations a push-payment gateway provides.
///
/// Implementations hold no mutable state between calls: no token cache,
/// no record of pushes issued.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Call the token endpoint and return its 2xx body unchanged.
    ///
    /// Every call goes to the gateway; tokens are never reused.
    async fn request_token(&self) -> PaymentResult<serde_json::Value>;

    /// Request a fresh OAuth access token and extract `access_token`.
    async fn acquire_access_token(&self) -> PaymentResult<AccessToken> {
        let body = self.request_token().await?;
        AccessToken::from_body(&body).ok_or_else(|| {
            PaymentError::UpstreamAuth("access_token missing from response".to_string())
        })
    }

    /// Prompt the customer's phone to confirm a payment.
    ///
    /// # Arguments
    /// * `phone` - Subscriber number as the caller sent it (not validated)
    /// * `amount` - Amount as the caller sent it (not validated)
    ///
    /// `Null` means the caller omitted the field; it is left out of the
    /// upstream body.
    ///
    /// # Returns
    /// The gateway's acknowledgement body, unchanged.
    async fn initiate_push(
        &self,
        phone: &serde_json::Value,
        amount: &serde_json::Value,
    ) -> PaymentResult<serde_json::Value>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
