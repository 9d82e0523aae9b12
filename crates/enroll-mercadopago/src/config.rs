//! # Mercado Pago Configuration
//!
//! Configuration management for the Mercado Pago integration.
//! The access token is loaded from the environment.

use enroll_core::{env, EnrollResult};
use std::time::Duration;

/// Variables that must be present for the gateway to work
pub const REQUIRED_ENV: [&str; 1] = ["MERCADOPAGO_TOKEN"];

const DEFAULT_API_BASE_URL: &str = "https://api.mercadopago.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Mercado Pago API configuration
#[derive(Clone)]
pub struct MercadoPagoConfig {
    /// Access token (TEST-... or APP_USR-...)
    pub access_token: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Currency sent as `currency_id`; the account default when `None`
    pub currency_id: Option<String>,

    /// Timeout for each outbound request
    pub timeout: Duration,
}

impl MercadoPagoConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `MERCADOPAGO_TOKEN`
    ///
    /// Optional: `MERCADOPAGO_API_URL`, `MERCADOPAGO_CURRENCY`,
    /// `MERCADOPAGO_TIMEOUT_SECS`.
    pub fn from_env() -> EnrollResult<Self> {
        let access_token = env::required("MERCADOPAGO_TOKEN")?;

        Ok(Self {
            access_token,
            api_base_url: env::var("MERCADOPAGO_API_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            currency_id: env::var("MERCADOPAGO_CURRENCY"),
            timeout: env::timeout_secs("MERCADOPAGO_TIMEOUT_SECS", DEFAULT_TIMEOUT)?,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            currency_id: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Check if using a test credential
    pub fn is_test_mode(&self) -> bool {
        self.access_token.starts_with("TEST-")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    pub fn preferences_url(&self) -> String {
        format!(
            "{}/checkout/preferences",
            self.api_base_url.trim_end_matches('/')
        )
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set currency
    pub fn with_currency(mut self, currency_id: impl Into<String>) -> Self {
        self.currency_id = Some(currency_id.into());
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for MercadoPagoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MercadoPagoConfig")
            .field("access_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("currency_id", &self.currency_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}
