//! # Mercado Pago Checkout Pro
//!
//! Creates checkout preferences. The payer is redirected to the returned
//! `init_point` to pay on Mercado Pago's hosted page.

use crate::config::MercadoPagoConfig;
use async_trait::async_trait;
use enroll_core::{
    lenient_json, CheckoutRequest, CheckoutSession, EnrollError, EnrollResult, PaymentGateway,
    Price,
};
use reqwest::{header::AUTHORIZATION, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace};

/// Send the payer back to the site only for approved payments
const AUTO_RETURN: &str = "approved";

/// Mercado Pago preference gateway
pub struct MercadoPagoCheckout {
    config: MercadoPagoConfig,
    client: Client,
}

impl MercadoPagoCheckout {
    pub fn new(config: MercadoPagoConfig) -> EnrollResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EnrollError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> EnrollResult<Self> {
        Self::new(MercadoPagoConfig::from_env()?)
    }

    fn build_preference<'a>(&'a self, request: &'a CheckoutRequest) -> PreferenceRequest<'a> {
        PreferenceRequest {
            items: vec![PreferenceItem {
                title: &request.title,
                quantity: request.quantity,
                unit_price: request.unit_price,
                currency_id: self.config.currency_id.as_deref(),
            }],
            payer: PreferencePayer {
                name: &request.payer.name,
                email: &request.payer.email,
            },
            back_urls: PreferenceBackUrls {
                success: &request.back_urls.success,
                failure: &request.back_urls.failure,
                pending: &request.back_urls.pending,
            },
            auto_return: AUTO_RETURN,
            external_reference: request.external_reference.as_deref(),
        }
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoCheckout {
    #[instrument(skip(self, request), fields(title = %request.title, unit_price = %request.unit_price.display()))]
    async fn create_checkout(&self, request: &CheckoutRequest) -> EnrollResult<CheckoutSession> {
        let preference = self.build_preference(request);
        let url = self.config.preferences_url();

        debug!(
            "Creating Mercado Pago preference: test_mode={}",
            self.config.is_test_mode()
        );

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.config.auth_header())
            .json(&preference)
            .send()
            .await
            .map_err(|e| {
                error!("Mercado Pago request failed: {}", e);
                EnrollError::PaymentUnreachable(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EnrollError::PaymentUnreachable(e.to_string()))?;

        debug!("Mercado Pago status={}", status);
        trace!("Mercado Pago body={}", body);

        if !status.is_success() {
            let details = lenient_json(&body);
            let message = serde_json::from_value::<MercadoPagoErrorResponse>(details.clone())
                .map(|e| e.message)
                .unwrap_or_else(|_| body.clone());
            error!("Mercado Pago API error: status={}, message={}", status, message);

            return Err(EnrollError::PaymentRejected {
                status: status.as_u16(),
                details,
            });
        }

        let preference: PreferenceResponse = serde_json::from_str(&body).map_err(|e| {
            EnrollError::UnexpectedPaymentResponse {
                message: format!("Failed to parse preference: {}", e),
                details: lenient_json(&body),
            }
        })?;

        let checkout_url = preference
            .init_point
            .ok_or_else(|| EnrollError::UnexpectedPaymentResponse {
                message: "preference has no init_point".to_string(),
                details: lenient_json(&body),
            })?;

        info!(
            "Created Mercado Pago preference: id={:?}, url={}",
            preference.id, checkout_url
        );

        Ok(CheckoutSession {
            id: preference.id,
            checkout_url,
            provider: self.provider_name().to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mercadopago"
    }
}

// =============================================================================
// Mercado Pago API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct PreferenceRequest<'a> {
    items: Vec<PreferenceItem<'a>>,
    payer: PreferencePayer<'a>,
    back_urls: PreferenceBackUrls<'a>,
    auto_return: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_reference: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PreferenceItem<'a> {
    title: &'a str,
    quantity: u32,
    unit_price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PreferencePayer<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct PreferenceBackUrls<'a> {
    success: &'a str,
    failure: &'a str,
    pending: &'a str,
}

#[derive(Debug, Deserialize)]
struct PreferenceResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    init_point: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MercadoPagoErrorResponse {
    message: String,
}
