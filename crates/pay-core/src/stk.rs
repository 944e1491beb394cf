//! # STK Push Types
//!
//! Wire types for the Lipa Na M-Pesa Online (STK Push) flow: the request
//! timestamp, the derived password, and the push request body.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request timestamp in the gateway's `YYYYMMDDHHMMSS` format.
///
/// The same value must be used for the password and the request body,
/// so capture it once per push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Width of the timestamp string
    pub const LEN: usize = 14;

    /// Capture the current UTC time
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Render a point in time
    pub fn at(time: DateTime<Utc>) -> Self {
        Self::from_iso8601(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Strip every non-digit from an ISO-8601 string and keep the first 14
    /// digits: `2024-01-02T03:04:05.678Z` becomes `20240102030405`.
    pub fn from_iso8601(iso: &str) -> Self {
        Self(
            iso.chars()
                .filter(char::is_ascii_digit)
                .take(Self::LEN)
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the STK password: `base64(shortcode + passkey + timestamp)`.
pub fn stk_password(shortcode: &str, passkey: &str, timestamp: &Timestamp) -> String {
    STANDARD.encode(format!("{}{}{}", shortcode, passkey, timestamp))
}

/// Transaction type sent with every push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Paybill payment
    CustomerPayBillOnline,
}

/// STK Push request body, serialized with the gateway's field names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushRequest {
    pub business_short_code: String,
    pub password: String,
    pub timestamp: Timestamp,
    pub transaction_type: TransactionType,
    /// Forwarded exactly as the caller sent it; omitted when absent
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub amount: serde_json::Value,
    /// Paying phone number, as sent by the caller
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub party_a: serde_json::Value,
    /// Receiving shortcode
    pub party_b: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub phone_number: serde_json::Value,
    #[serde(rename = "CallBackURL")]
    pub callback_url: String,
    pub account_reference: String,
    pub transaction_desc: String,
}

/// Static reference/description strings attached to every push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushDefaults {
    #[serde(default = "default_account_reference")]
    pub account_reference: String,
    #[serde(default = "default_transaction_desc")]
    pub transaction_desc: String,
}

fn default_account_reference() -> String {
    "EcommerceApp".to_string()
}

fn default_transaction_desc() -> String {
    "Payment for goods".to_string()
}

impl Default for PushDefaults {
    fn default() -> Self {
        Self {
            account_reference: default_account_reference(),
            transaction_desc: default_transaction_desc(),
        }
    }
}

/// Layout of `config/mpesa.toml`
#[derive(Debug, Default, Deserialize)]
struct PushDefaultsFile {
    #[serde(default)]
    push: PushDefaults,
}

impl PushDefaults {
    /// Parse the `[push]` table of a TOML document. Missing keys keep
    /// their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: PushDefaultsFile = toml::from_str(content)?;
        Ok(file.push)
    }
}

/// OAuth access token returned by the token endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    /// Bearer token string (`access_token`)
    pub token: String,
}

impl AccessToken {
    /// Extract the token from an upstream body. Returns `None` when
    /// `access_token` is missing or not a string.
    pub fn from_body(body: &serde_json::Value) -> Option<Self> {
        let token = body.get("access_token")?.as_str()?.to_string();
        Some(Self { token })
    }
}
