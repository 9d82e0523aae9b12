//! # enroll-mercadopago
//!
//! Mercado Pago Checkout Pro gateway for enroll-checkout-rs.
//!
//! Each call creates one checkout preference and returns its `init_point`,
//! the hosted page the payer is sent to.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use enroll_mercadopago::MercadoPagoCheckout;
//! use enroll_core::{BackUrls, CheckoutRequest, PaymentGateway};
//!
//! let gateway = MercadoPagoCheckout::from_env()?;
//!
//! let request = CheckoutRequest::for_registration(&registration, &BackUrls::from_site(site));
//! let session = gateway.create_checkout(&request).await?;
//!
//! // Redirect the payer to session.checkout_url
//! ```

pub mod checkout;
pub mod config;

// Re-exports
pub use checkout::MercadoPagoCheckout;
pub use config::{MercadoPagoConfig, REQUIRED_ENV};
