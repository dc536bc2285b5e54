//! # Artisan Storefront
//!
//! Commerce engine for handcrafted goods.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export GATEWAY_KEY_ID=gwk_test_...
//! export GATEWAY_KEY_SECRET=gws_...
//! export BACKEND_URL=https://backend.example.com
//! export BACKEND_API_KEY=...
//!
//! # Run the server
//! artisan-store
//! ```

use store_api::{routes, state::AppState};
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

    print_banner();

    // Initialize application state (also kicks off the country prefetch)
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🛒 Artisan Storefront starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("💳 Checkout: POST http://{}/api/v1/checkout", addr);
        info!("🔏 Verify: POST http://{}/api/v1/payments/verify", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  🛠  Artisan Storefront
  ━━━━━━━━━━━━━━━━━━━━━━━
  Handcrafted goods, delivered
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
