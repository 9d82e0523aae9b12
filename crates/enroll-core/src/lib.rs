//! # enroll-core
//!
//! Core types and traits for the course registration checkout.
//!
//! This crate provides:
//! - `CourseModule`, `Price` and `PriceTable` for pricing
//! - `RegistrationForm` → `NewRegistration` validation
//! - `CheckoutRequest` and `CheckoutSession` for the hosted checkout
//! - `RegistrationStore` and `PaymentGateway` traits for the two backends
//! - `EnrollError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use enroll_core::{BackUrls, CheckoutRequest, PriceTable, RegistrationForm};
//!
//! let prices = PriceTable::default();
//! let registration = RegistrationForm::from_json(body)?.validate(&prices)?;
//!
//! let stored = store.create_registration(&registration).await?;
//!
//! let request = CheckoutRequest::for_registration(&registration, &BackUrls::from_site(site))
//!     .with_external_reference(stored.as_ref().and_then(|r| r.id.as_ref()));
//! let session = gateway.create_checkout(&request).await?;
//!
//! // Redirect the payer to session.checkout_url
//! ```

pub mod backend;
pub mod checkout;
pub mod env;
pub mod error;
pub mod pricing;
pub mod registration;
pub mod upstream;

// Re-exports for convenience
pub use backend::{BoxedPaymentGateway, BoxedRegistrationStore, PaymentGateway, RegistrationStore};
pub use checkout::{BackUrls, CheckoutRequest, CheckoutSession, Payer};
pub use error::{EnrollError, EnrollResult, ErrorKind};
pub use pricing::{CourseModule, Price, PriceTable};
pub use registration::{NewRegistration, RecordId, RegistrationForm, StoredRegistration};
pub use upstream::lenient_json;
