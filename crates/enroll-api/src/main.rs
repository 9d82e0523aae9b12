//! # Enroll-Checkout RS
//!
//! Course registration with hosted checkout.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export SUPABASE_URL=https://<ref>.supabase.co
//! export SUPABASE_SERVICE_KEY=...
//! export MERCADOPAGO_TOKEN=APP_USR-...
//! export SITE_URL=https://cursos.example.com
//!
//! # Run the server (LOG_FORMAT=json for JSON logs)
//! enroll-checkout
//! ```

use enroll_api::{routes, state::AppState};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the log settings are read
    dotenvy::dotenv().ok();
    init_tracing();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    for (module, price) in state.prices.entries() {
        info!("Price: {} = {}", module, price.display());
    }
    if !state.is_configured() {
        warn!("Registrations will fail until the backend configuration is complete");
    }

    // Create router
    let app = routes::create_router(state);

    info!(
        "enroll-checkout {} listening on http://{}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    if !is_prod {
        info!("Registration: POST http://{}/api/inscricao", addr);
        info!("Prices: GET http://{}/api/modulos", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}
