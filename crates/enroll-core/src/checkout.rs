//! # Checkout Types
//!
//! Provider-neutral description of the hosted checkout a registration needs,
//! and the session the provider creates for it.

use crate::pricing::Price;
use crate::registration::{NewRegistration, RecordId};

/// Redirect targets after the hosted checkout finishes.
///
/// `pending` deliberately shares the error page with `failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

impl BackUrls {
    /// Derive the three URLs from the public site base URL
    pub fn from_site(site_url: &str) -> Self {
        let base = site_url.trim_end_matches('/');
        Self {
            success: format!("{}/sucesso.html", base),
            failure: format!("{}/erro.html", base),
            pending: format!("{}/erro.html", base),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payer {
    pub name: String,
    pub email: String,
}

/// Everything a payment gateway needs to open a checkout
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub title: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub payer: Payer,
    pub back_urls: BackUrls,
    /// Registration id, so a payment can be traced back to its signup
    pub external_reference: Option<String>,
}

impl CheckoutRequest {
    /// Single-item checkout for a registration
    pub fn for_registration(registration: &NewRegistration, back_urls: &BackUrls) -> Self {
        Self {
            title: registration.checkout_title(),
            quantity: 1,
            unit_price: registration.price,
            payer: Payer {
                name: registration.name.clone(),
                email: registration.email.clone(),
            },
            back_urls: back_urls.clone(),
            external_reference: None,
        }
    }

    /// Builder: attach the stored registration id
    pub fn with_external_reference(mut self, id: Option<&RecordId>) -> Self {
        self.external_reference = id.map(RecordId::to_string);
        self
    }
}

/// Checkout session created by the payment provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Provider's identifier (Mercado Pago preference id)
    pub id: Option<String>,
    /// URL the payer is redirected to
    pub checkout_url: String,
    /// Provider name
    pub provider: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{CourseModule, Price};

    fn registration() -> NewRegistration {
        NewRegistration {
            name: "Ana".into(),
            contact_number: "+5511999999999".into(),
            email: "ana@x.com".into(),
            course: "Python".into(),
            module: CourseModule::Intermediate,
            price: Price::whole(70),
        }
    }

    #[test]
    fn test_back_urls() {
        let urls = BackUrls::from_site("https://cursos.example.com/");

        assert_eq!(urls.success, "https://cursos.example.com/sucesso.html");
        assert_eq!(urls.failure, "https://cursos.example.com/erro.html");
        assert_eq!(urls.pending, urls.failure);
    }

    #[test]
    fn test_request_for_registration() {
        let urls = BackUrls::from_site("https://cursos.example.com");
        let request = CheckoutRequest::for_registration(&registration(), &urls);

        assert_eq!(request.title, "Python – Intermediário");
        assert_eq!(request.quantity, 1);
        assert_eq!(request.unit_price, Price::whole(70));
        assert_eq!(request.payer.email, "ana@x.com");
        assert_eq!(request.back_urls, urls);
        assert!(request.external_reference.is_none());
    }

    #[test]
    fn test_external_reference() {
        let urls = BackUrls::from_site("https://cursos.example.com");
        let request = CheckoutRequest::for_registration(&registration(), &urls)
            .with_external_reference(Some(&RecordId::Int(7)));

        assert_eq!(request.external_reference.as_deref(), Some("7"));
    }
}
