//! # Application State
//!
//! Shared state for the Axum application: the price table and the two
//! backends the registration handler talks to.

use enroll_core::{
    env, BackUrls, BoxedPaymentGateway, BoxedRegistrationStore, EnrollError, EnrollResult,
    PriceTable,
};
use enroll_mercadopago::MercadoPagoCheckout;
use enroll_supabase::SupabaseStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Site base URL used for the checkout back URLs
pub const SITE_URL_ENV: &str = "SITE_URL";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Explicit price table file
    pub price_table_path: Option<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: env::var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            price_table_path: env::var("PRICE_TABLE_PATH"),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            price_table_path: None,
        }
    }
}

/// Storage, payment gateway and redirect URLs for one deployment
#[derive(Clone)]
pub struct Backends {
    pub store: BoxedRegistrationStore,
    pub gateway: BoxedPaymentGateway,
    pub back_urls: BackUrls,
}

impl Backends {
    pub fn new(
        store: BoxedRegistrationStore,
        gateway: BoxedPaymentGateway,
        back_urls: BackUrls,
    ) -> Self {
        Self {
            store,
            gateway,
            back_urls,
        }
    }

    /// Build the Supabase + Mercado Pago backends from the environment.
    ///
    /// Reports every missing variable at once.
    pub fn from_env() -> EnrollResult<Self> {
        let required: Vec<&str> = enroll_supabase::REQUIRED_ENV
            .into_iter()
            .chain(enroll_mercadopago::REQUIRED_ENV)
            .chain([SITE_URL_ENV])
            .collect();

        for name in &required {
            debug!("env check: {} present={}", name, env::var(name).is_some());
        }

        let missing = env::missing(&required);
        if !missing.is_empty() {
            return Err(EnrollError::Configuration(format!(
                "missing environment variables: {}",
                missing.join(", ")
            )));
        }

        let store = SupabaseStore::from_env()?;
        let gateway = MercadoPagoCheckout::from_env()?;
        let back_urls = BackUrls::from_site(&env::required(SITE_URL_ENV)?);

        Ok(Self::new(Arc::new(store), Arc::new(gateway), back_urls))
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Module prices, loaded once
    pub prices: Arc<PriceTable>,
    /// Backends, or why they could not be configured
    backends: Result<Backends, String>,
}

impl AppState {
    /// Create state from the environment.
    ///
    /// Missing backend configuration does not stop startup; registrations
    /// are answered with a configuration error until it is fixed.
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let prices = load_price_table(config.price_table_path.as_deref())?;

        let backends = Backends::from_env().map_err(|e| {
            warn!("Backends not configured: {}", e);
            e.to_string()
        });

        Ok(Self {
            config,
            prices: Arc::new(prices),
            backends,
        })
    }

    /// State with explicit backends (for tests and embedding)
    pub fn with_backends(config: AppConfig, prices: PriceTable, backends: Backends) -> Self {
        Self {
            config,
            prices: Arc::new(prices),
            backends: Ok(backends),
        }
    }

    /// State whose registrations always fail with a configuration error
    pub fn unconfigured(config: AppConfig, prices: PriceTable, reason: impl Into<String>) -> Self {
        Self {
            config,
            prices: Arc::new(prices),
            backends: Err(reason.into()),
        }
    }

    pub fn backends(&self) -> EnrollResult<&Backends> {
        self.backends
            .as_ref()
            .map_err(|reason| EnrollError::Configuration(reason.clone()))
    }

    pub fn is_configured(&self) -> bool {
        self.backends.is_ok()
    }
}

/// Load the price table: explicit path, then `config/prices.toml`, then
/// the built-in defaults.
fn load_price_table(explicit: Option<&str>) -> anyhow::Result<PriceTable> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        let table = PriceTable::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
        info!("Loaded price table from {}", path);
        return Ok(table);
    }

    let config_paths = [
        "config/prices.toml",
        "../config/prices.toml",
        "../../config/prices.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let table = PriceTable::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            info!("Loaded price table from {}", path);
            return Ok(table);
        }
    }

    info!("No price table file found, using built-in prices");
    Ok(PriceTable::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ..AppConfig::default()
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");

        let bad = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_unconfigured_state() {
        let state = AppState::unconfigured(
            AppConfig::default(),
            PriceTable::default(),
            "missing environment variables: SITE_URL",
        );

        assert!(!state.is_configured());
        assert!(matches!(
            state.backends(),
            Err(EnrollError::Configuration(_))
        ));
    }

    #[test]
    fn test_explicit_price_table_must_exist() {
        assert!(load_price_table(Some("/nonexistent/prices.toml")).is_err());
    }
}
