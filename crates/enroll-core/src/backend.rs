//! # Backend Traits
//!
//! Seams between the registration handler and the two external services.
//!
//! ```text
//!            Registration handler
//!             │               │
//!   RegistrationStore    PaymentGateway
//!             │               │
//!      SupabaseStore   MercadoPagoCheckout
//! ```
//!
//! The HTTP layer holds them as trait objects so tests can swap in
//! in-memory doubles.

use crate::checkout::{CheckoutRequest, CheckoutSession};
use crate::error::EnrollResult;
use crate::registration::{NewRegistration, RecordId, StoredRegistration};
use async_trait::async_trait;
use std::sync::Arc;

/// Where registrations are persisted.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Insert a registration and return the created row.
    ///
    /// `Ok(None)` means the backend accepted the insert but did not hand a
    /// row back, so nothing can be linked later.
    async fn create_registration(
        &self,
        registration: &NewRegistration,
    ) -> EnrollResult<Option<StoredRegistration>>;

    /// Record the checkout session id on an existing registration.
    async fn link_checkout(&self, id: &RecordId, session_id: &str) -> EnrollResult<()>;

    /// Backend name (for logging)
    fn backend_name(&self) -> &'static str;
}

/// Hosted checkout provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout session and return its redirect URL.
    async fn create_checkout(&self, request: &CheckoutRequest) -> EnrollResult<CheckoutSession>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

pub type BoxedRegistrationStore = Arc<dyn RegistrationStore>;

pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
