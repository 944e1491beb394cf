//! # mpesa-push
//!
//! M-Pesa STK push backend.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export MPESA_CONSUMER_KEY=...
//! export MPESA_CONSUMER_SECRET=...
//! export MPESA_SHORTCODE=174379
//! export MPESA_PASSKEY=...
//! export PUBLIC_URL=https://my-app.onrender.com
//!
//! # Run the server
//! mpesa-push
//! ```

use pay_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Print banner
    print_banner();

    // Initialize application state; fails fast on missing credentials
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.gateway.provider_name());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("M-Pesa backend running on http://{}", addr);

    if !is_prod {
        info!("Token: GET http://{}/token", addr);
        info!("STK push: POST http://{}/stkpush", addr);
        info!("Callback: POST http://{}/callback", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  mpesa-push
  ━━━━━━━━━━━━━━━━━━━━━━━
  Lipa Na M-Pesa Online backend
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
