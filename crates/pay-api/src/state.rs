//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the payment gateway, the callback sink, and configuration.

use pay_core::{BoxedPaymentGateway, PushDefaults};
use pay_mpesa::{CallbackSink, DarajaClient, LoggingCallbackSink, MpesaConfig};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Include the underlying error text in 500 bodies
    pub expose_upstream_errors: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            expose_upstream_errors: std::env::var("EXPOSE_UPSTREAM_ERRORS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            environment: "development".to_string(),
            expose_upstream_errors: false,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment gateway
    pub gateway: BoxedPaymentGateway,
    /// Callback sink
    pub callbacks: Arc<dyn CallbackSink>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by Daraja.
    ///
    /// Fails if any gateway setting is missing.
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let mpesa_config = MpesaConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize M-Pesa: {}", e))?
            .with_push_defaults(load_push_defaults()?);

        tracing::info!(
            "M-Pesa gateway: base_url={}, shortcode={}, sandbox={}",
            mpesa_config.api_base_url,
            mpesa_config.shortcode,
            mpesa_config.is_sandbox()
        );

        let client = DarajaClient::new(mpesa_config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize M-Pesa: {}", e))?;

        Ok(Self::with_gateway(Arc::new(client), config))
    }

    /// Create state around an existing gateway, logging callbacks
    pub fn with_gateway(gateway: BoxedPaymentGateway, config: AppConfig) -> Self {
        Self {
            gateway,
            callbacks: Arc::new(LoggingCallbackSink),
            config,
        }
    }

    /// Builder: replace the callback sink
    pub fn with_callback_sink(mut self, sink: Arc<dyn CallbackSink>) -> Self {
        self.callbacks = sink;
        self
    }
}

/// Load push reference/description strings from config file
fn load_push_defaults() -> anyhow::Result<PushDefaults> {
    // Try to load from config/mpesa.toml
    let config_paths = [
        "config/mpesa.toml",
        "../config/mpesa.toml",
        "../../config/mpesa.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let defaults = PushDefaults::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!(
                "Loaded push defaults from {}: account_reference={}",
                path,
                defaults.account_reference
            );
            return Ok(defaults);
        }
    }

    tracing::debug!("No config/mpesa.toml found, using built-in push defaults");
    Ok(PushDefaults::default())
}
