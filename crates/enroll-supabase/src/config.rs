//! # Supabase Configuration
//!
//! Connection settings for the registrations table.
//! Secrets are loaded from environment variables.

use enroll_core::{env, EnrollResult};
use std::time::Duration;

/// Variables that must be present for the store to work
pub const REQUIRED_ENV: [&str; 2] = ["SUPABASE_URL", "SUPABASE_SERVICE_KEY"];

const DEFAULT_TABLE: &str = "inscricoes";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Supabase REST configuration
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL (https://<ref>.supabase.co)
    pub url: String,

    /// Service role key, sent both as `apikey` and as bearer token
    pub service_key: String,

    /// Table holding registrations
    pub table: String,

    /// Timeout for each outbound request
    pub timeout: Duration,
}

impl SupabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `SUPABASE_URL`
    /// - `SUPABASE_SERVICE_KEY`
    ///
    /// Optional: `SUPABASE_TABLE`, `SUPABASE_TIMEOUT_SECS`.
    pub fn from_env() -> EnrollResult<Self> {
        let url = env::required("SUPABASE_URL")?;
        let service_key = env::required("SUPABASE_SERVICE_KEY")?;

        Ok(Self {
            url,
            service_key,
            table: env::var("SUPABASE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            timeout: env::timeout_secs("SUPABASE_TIMEOUT_SECS", DEFAULT_TIMEOUT)?,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
            table: DEFAULT_TABLE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Builder: set table name
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// PostgREST endpoint of the registrations table
    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), self.table)
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.service_key)
    }
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .field("table", &self.table)
            .field("timeout", &self.timeout)
            .finish()
    }
}
