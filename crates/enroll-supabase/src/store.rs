//! # Supabase Registration Store
//!
//! Inserts registrations through the PostgREST data API and links them to
//! their checkout session afterwards.

use crate::config::SupabaseConfig;
use async_trait::async_trait;
use enroll_core::{
    lenient_json, EnrollError, EnrollResult, NewRegistration, RecordId, RegistrationStore,
    StoredRegistration,
};
use reqwest::{header::AUTHORIZATION, Client, Response};
use serde_json::{json, Value};
use tracing::{debug, error, instrument, trace};

/// Column that receives the Mercado Pago preference id
const SESSION_COLUMN: &str = "mercadopago_preference_id";

/// Registration store backed by a Supabase table
pub struct SupabaseStore {
    config: SupabaseConfig,
    client: Client,
}

impl SupabaseStore {
    pub fn new(config: SupabaseConfig) -> EnrollResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EnrollError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> EnrollResult<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.service_key)
            .header(AUTHORIZATION, self.config.auth_header())
    }
}

/// Read status and body, mapping transport failures.
async fn read_response(response: Response) -> EnrollResult<(reqwest::StatusCode, String)> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| EnrollError::StorageUnreachable(e.to_string()))?;
    Ok((status, body))
}

/// Normalize a `return=representation` body.
///
/// PostgREST answers inserts with an array of rows; the first one is ours.
/// A bare object is accepted too. Anything else means no row came back.
fn first_row(body: &str) -> Option<StoredRegistration> {
    let row = match serde_json::from_str::<Value>(body).ok()? {
        Value::Array(rows) => rows.into_iter().next()?,
        row @ Value::Object(_) => row,
        _ => return None,
    };
    serde_json::from_value(row).ok()
}

#[async_trait]
impl RegistrationStore for SupabaseStore {
    #[instrument(skip(self, registration), fields(table = %self.config.table, module = %registration.module))]
    async fn create_registration(
        &self,
        registration: &NewRegistration,
    ) -> EnrollResult<Option<StoredRegistration>> {
        let url = self.config.table_url();
        debug!("Inserting registration: url={}", url);

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(registration)
            .send()
            .await
            .map_err(|e| {
                error!("Supabase insert failed: {}", e);
                EnrollError::StorageUnreachable(e.to_string())
            })?;

        let (status, body) = read_response(response).await?;
        debug!("Supabase insert status={}", status);
        trace!("Supabase insert body={}", body);

        if !status.is_success() {
            error!("Supabase insert rejected: status={}, body={}", status, body);
            return Err(EnrollError::StorageRejected {
                status: status.as_u16(),
                details: lenient_json(&body),
            });
        }

        Ok(first_row(&body))
    }

    #[instrument(skip(self), fields(table = %self.config.table))]
    async fn link_checkout(&self, id: &RecordId, session_id: &str) -> EnrollResult<()> {
        let url = self.config.table_url();
        let filter = format!("eq.{}", id);

        let response = self
            .authorized(self.client.patch(&url))
            .query(&[("id", filter.as_str())])
            .json(&json!({ SESSION_COLUMN: session_id }))
            .send()
            .await
            .map_err(|e| EnrollError::StorageUnreachable(e.to_string()))?;

        let (status, body) = read_response(response).await?;
        debug!("Supabase patch status={}", status);

        if !status.is_success() {
            return Err(EnrollError::StorageRejected {
                status: status.as_u16(),
                details: lenient_json(&body),
            });
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "supabase"
    }
}
