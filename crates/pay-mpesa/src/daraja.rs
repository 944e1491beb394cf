//! # Daraja STK Push
//!
//! Implementation of the Lipa Na M-Pesa Online flow against the Daraja API:
//! OAuth token, then STK push. This is the only payment flow in the repo.

use crate::config::MpesaConfig;
use async_trait::async_trait;
use pay_core::{
    stk_password, AccessToken, PaymentError, PaymentGateway, PaymentResult, StkPushRequest,
    Timestamp, TransactionType,
};
use reqwest::{header::AUTHORIZATION, Client};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Daraja gateway client
///
/// Holds read-only configuration and a pooled HTTP client. Tokens are
/// fetched per push and never cached.
#[derive(Clone)]
pub struct DarajaClient {
    config: Arc<MpesaConfig>,
    client: Client,
}

impl DarajaClient {
    /// Create a new Daraja client.
    ///
    /// No request timeout is set; the transport default applies.
    pub fn new(config: MpesaConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("mpesa-push-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = MpesaConfig::from_env()?;
        Self::new(config)
    }

    /// Access the configuration
    pub fn config(&self) -> &MpesaConfig {
        &self.config
    }

    /// Build the push body for one request.
    ///
    /// The password is derived from the same `timestamp` that goes in the
    /// body.
    pub fn build_push_request(
        &self,
        phone: &serde_json::Value,
        amount: &serde_json::Value,
        timestamp: Timestamp,
    ) -> StkPushRequest {
        let config = &self.config;
        StkPushRequest {
            business_short_code: config.shortcode.clone(),
            password: stk_password(&config.shortcode, &config.passkey, &timestamp),
            timestamp,
            transaction_type: TransactionType::CustomerPayBillOnline,
            amount: amount.clone(),
            party_a: phone.clone(),
            party_b: config.shortcode.clone(),
            phone_number: phone.clone(),
            callback_url: config.callback_url.clone(),
            account_reference: config.push.account_reference.clone(),
            transaction_desc: config.push.transaction_desc.clone(),
        }
    }

    /// Send the push body with a bearer token
    async fn send_push(
        &self,
        token: &AccessToken,
        request: &StkPushRequest,
    ) -> PaymentResult<serde_json::Value> {
        let response = self
            .client
            .post(self.config.stk_push_url())
            .header(AUTHORIZATION, format!("Bearer {}", token.token))
            .json(request)
            .send()
            .await
            .map_err(|e| PaymentError::UpstreamPush(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::UpstreamPush(e.to_string()))?;

        if !status.is_success() {
            error!("Daraja push error: status={}, body={}", status, body);
            return Err(PaymentError::UpstreamPush(format!("HTTP {}: {}", status, body)));
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::UpstreamPush(format!("Failed to parse push response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentGateway for DarajaClient {
    #[instrument(skip(self))]
    async fn request_token(&self) -> PaymentResult<serde_json::Value> {
        let response = self
            .client
            .get(self.config.token_url())
            .header(AUTHORIZATION, self.config.basic_auth_header())
            .send()
            .await
            .map_err(|e| PaymentError::UpstreamAuth(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::UpstreamAuth(e.to_string()))?;

        if !status.is_success() {
            error!("Daraja token error: status={}, body={}", status, body);
            return Err(PaymentError::UpstreamAuth(format!("HTTP {}: {}", status, body)));
        }

        let token_body = serde_json::from_str(&body).map_err(|e| {
            PaymentError::UpstreamAuth(format!("Failed to parse token response: {}", e))
        })?;

        debug!("Obtained Daraja token response");
        Ok(token_body)
    }

    #[instrument(skip(self, phone))]
    async fn initiate_push(
        &self,
        phone: &serde_json::Value,
        amount: &serde_json::Value,
    ) -> PaymentResult<serde_json::Value> {
        let token = self.acquire_access_token().await?;

        let request = self.build_push_request(phone, amount, Timestamp::now());
        debug!(
            "Sending STK push: shortcode={}, timestamp={}",
            request.business_short_code, request.timestamp
        );

        let ack = self.send_push(&token, &request).await?;

        info!(
            "STK push accepted: checkout_request_id={}",
            ack.get("CheckoutRequestID")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
        );

        Ok(ack)
    }

    fn provider_name(&self) -> &'static str {
        "mpesa"
    }
}
