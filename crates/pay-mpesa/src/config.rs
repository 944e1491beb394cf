//! # M-Pesa Configuration
//!
//! Configuration management for the Daraja integration.
//! All secrets are loaded from environment variables, once, at startup.

use base64::{engine::general_purpose::STANDARD, Engine};
use pay_core::{PaymentError, PushDefaults};
use std::{env, fmt};

/// Daraja sandbox host
pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";

/// Daraja production host
pub const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke";

/// Daraja API configuration
#[derive(Clone)]
pub struct MpesaConfig {
    /// App consumer key
    pub consumer_key: String,

    /// App consumer secret
    pub consumer_secret: String,

    /// Merchant shortcode (paybill number)
    pub shortcode: String,

    /// Lipa Na M-Pesa Online passkey
    pub passkey: String,

    /// API base URL (sandbox, production, or a stub in tests)
    pub api_base_url: String,

    /// Public URL the gateway posts results to
    pub callback_url: String,

    /// Reference/description strings sent with each push
    pub push: PushDefaults,
}

impl MpesaConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars (the `MPESA_`-prefixed name wins if both are set):
    /// - `MPESA_CONSUMER_KEY` / `CONSUMER_KEY`
    /// - `MPESA_CONSUMER_SECRET` / `CONSUMER_SECRET`
    /// - `MPESA_SHORTCODE` / `SHORTCODE`
    /// - `MPESA_PASSKEY` / `PASSKEY`
    /// - `MPESA_CALLBACK_URL` / `CALLBACK_URL`, or `PUBLIC_URL`
    ///
    /// Optional:
    /// - `MPESA_BASE_URL`
    /// - `MPESA_ENVIRONMENT` (`sandbox` or `production`, default `sandbox`)
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let consumer_key = required(&lookup, &["MPESA_CONSUMER_KEY", "CONSUMER_KEY"])?;
        let consumer_secret = required(&lookup, &["MPESA_CONSUMER_SECRET", "CONSUMER_SECRET"])?;
        let shortcode = required(&lookup, &["MPESA_SHORTCODE", "SHORTCODE"])?;
        let passkey = required(&lookup, &["MPESA_PASSKEY", "PASSKEY"])?;

        let api_base_url = match first(&lookup, &["MPESA_BASE_URL"]) {
            Some(url) => url,
            None => match first(&lookup, &["MPESA_ENVIRONMENT"]).as_deref() {
                None | Some("sandbox") => SANDBOX_BASE_URL.to_string(),
                Some("production") => PRODUCTION_BASE_URL.to_string(),
                Some(other) => {
                    return Err(PaymentError::Configuration(format!(
                        "MPESA_ENVIRONMENT must be sandbox or production, got {}",
                        other
                    )))
                }
            },
        };
        let api_base_url = validate_url("MPESA_BASE_URL", &api_base_url)?;

        let callback_url = match first(&lookup, &["MPESA_CALLBACK_URL", "CALLBACK_URL"]) {
            Some(url) => url,
            None => {
                let public_url = first(&lookup, &["PUBLIC_URL"]).ok_or_else(|| {
                    PaymentError::Configuration(
                        "MPESA_CALLBACK_URL, CALLBACK_URL or PUBLIC_URL must be set".to_string(),
                    )
                })?;
                format!("{}/callback", public_url.trim_end_matches('/'))
            }
        };
        let callback_url = validate_url("MPESA_CALLBACK_URL", &callback_url)?;

        Ok(Self {
            consumer_key,
            consumer_secret,
            shortcode,
            passkey,
            api_base_url,
            callback_url,
            push: PushDefaults::default(),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        shortcode: impl Into<String>,
        passkey: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            shortcode: shortcode.into(),
            passkey: passkey.into(),
            api_base_url: SANDBOX_BASE_URL.to_string(),
            callback_url: callback_url.into(),
            push: PushDefaults::default(),
        }
    }

    /// Check if pointed at the sandbox
    pub fn is_sandbox(&self) -> bool {
        self.api_base_url == SANDBOX_BASE_URL
    }

    /// `Basic base64(key:secret)` for the token endpoint
    pub fn basic_auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.consumer_key, self.consumer_secret);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    /// OAuth token endpoint
    pub fn token_url(&self) -> String {
        format!(
            "{}/oauth/v1/generate?grant_type=client_credentials",
            self.api_base_url
        )
    }

    /// STK push endpoint
    pub fn stk_push_url(&self) -> String {
        format!("{}/mpesa/stkpush/v1/processrequest", self.api_base_url)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set push reference/description strings
    pub fn with_push_defaults(mut self, push: PushDefaults) -> Self {
        self.push = push;
        self
    }
}

impl fmt::Debug for MpesaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpesaConfig")
            .field("consumer_key", &"***")
            .field("consumer_secret", &"***")
            .field("shortcode", &self.shortcode)
            .field("passkey", &"***")
            .field("api_base_url", &self.api_base_url)
            .field("callback_url", &self.callback_url)
            .field("push", &self.push)
            .finish()
    }
}

/// First non-empty value among `keys`
fn first<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn required<F>(lookup: &F, keys: &[&str]) -> Result<String, PaymentError>
where
    F: Fn(&str) -> Option<String>,
{
    first(lookup, keys)
        .ok_or_else(|| PaymentError::Configuration(format!("{} not set", keys.join(" or "))))
}

fn validate_url(name: &str, url: &str) -> Result<String, PaymentError> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(PaymentError::Configuration(format!(
            "{} must be an http(s) URL, got {}",
            name, url
        )));
    }
    Ok(url.trim_end_matches('/').to_string())
}
