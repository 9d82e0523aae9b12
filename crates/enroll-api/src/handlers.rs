//! # Request Handlers
//!
//! Axum request handlers for the registration API.
//!
//! A registration goes through
//! `Validating → PersistingRegistration → CreatingSession → LinkingSession → Responding`.
//! Failures before the checkout exists end the request with an error body;
//! a failed link only gets logged, because the payer must still be able
//! to pay.

use crate::state::{AppState, Backends};
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use enroll_core::{
    CheckoutRequest, CheckoutSession, CourseModule, EnrollError, EnrollResult, ErrorKind, Price,
    RecordId, RegistrationForm,
};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Successful registration response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Hosted checkout URL (redirect the payer here)
    pub checkout_url: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&EnrollError> for ErrorResponse {
    fn from(err: &EnrollError) -> Self {
        Self {
            error: err.public_message().to_string(),
            received: err.received().cloned(),
            details: err.details(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ModulePrice {
    modulo: CourseModule,
    valor: Price,
}

/// JSON body with an explicit status
pub fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(body)).into_response()
}

/// Convert an error into its JSON response
pub fn error_response(err: &EnrollError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(status, ErrorResponse::from(err))
}

/// Response for a handler panic (used by `CatchPanicLayer`)
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!("Handler panicked: {}", detail);
    error_response(&EnrollError::Internal(detail))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "enroll-checkout",
        "version": env!("CARGO_PKG_VERSION"),
        "configured": state.is_configured()
    }))
}

/// Module prices, in the order the form lists them
pub async fn list_modules(State(state): State<AppState>) -> impl IntoResponse {
    let modules: Vec<_> = state
        .prices
        .entries()
        .map(|(modulo, valor)| ModulePrice { modulo, valor })
        .collect();
    Json(serde_json::json!({
        "modules": modules,
        "count": modules.len()
    }))
}

/// Registration form submission. Accepts every method so that anything
/// other than POST gets a JSON 405 instead of an empty one.
pub async fn register(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("registration", %request_id, %method, path = %uri.path());

    async move {
        let started = Instant::now();

        match process_registration(&state, &method, &body).await {
            Ok(session) => {
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    provider = %session.provider,
                    "Registration checkout ready"
                );
                json_response(
                    StatusCode::OK,
                    CheckoutResponse {
                        checkout_url: session.checkout_url,
                    },
                )
            }
            Err(err) => {
                log_failure(&err);
                error_response(&err)
            }
        }
    }
    .instrument(span)
    .await
}

/// Run one registration through validation, storage and checkout.
pub async fn process_registration(
    state: &AppState,
    method: &Method,
    body: &[u8],
) -> EnrollResult<CheckoutSession> {
    if *method != Method::POST {
        return Err(EnrollError::MethodNotAllowed {
            method: method.to_string(),
        });
    }

    let form = RegistrationForm::from_json(body).unwrap_or_else(|e| {
        warn!("Malformed registration body, treating as empty: {}", e);
        RegistrationForm::default()
    });

    debug!(
        has_name = form.has_name(),
        has_whatsapp = form.has_contact_number(),
        has_email = form.has_email(),
        course = ?form.course_text(),
        module = ?form.module_text(),
        "Registration payload"
    );

    let registration = form.validate(&state.prices)?;
    let backends = state.backends()?;

    let stored = backends.store.create_registration(&registration).await?;
    let record_id = stored.as_ref().and_then(|row| row.id.as_ref());

    match &stored {
        Some(row) => debug!(
            id = ?row.id,
            created_at = ?row.created_at(),
            "Registration stored in {}",
            backends.store.backend_name()
        ),
        None => warn!("Storage returned no row, checkout will not be linked"),
    }

    let request = CheckoutRequest::for_registration(&registration, &backends.back_urls)
        .with_external_reference(record_id);
    let session = backends.gateway.create_checkout(&request).await?;

    if let (Some(id), Some(session_id)) = (record_id, session.id.as_deref()) {
        link_session(backends, id, session_id).await;
    }

    Ok(session)
}

/// Best-effort: a failure here never changes the response.
async fn link_session(backends: &Backends, id: &RecordId, session_id: &str) {
    match backends.store.link_checkout(id, session_id).await {
        Ok(()) => debug!("Linked registration {} to checkout {}", id, session_id),
        Err(e) => warn!(
            "Failed to link registration {} to checkout {} (non-blocking): {}",
            id, session_id, e
        ),
    }
}

fn log_failure(err: &EnrollError) {
    match err.kind() {
        ErrorKind::Method | ErrorKind::Validation => info!("Registration rejected: {}", err),
        ErrorKind::Configuration => error!("Registration not possible: {}", err),
        ErrorKind::Upstream | ErrorKind::Internal => error!("Registration failed: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use async_trait::async_trait;
    use enroll_core::{
        BackUrls, NewRegistration, PaymentGateway, PriceTable, RegistrationStore,
        StoredRegistration,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingStore {
        inserted: Mutex<Vec<NewRegistration>>,
        links: AtomicUsize,
    }

    #[async_trait]
    impl RegistrationStore for RecordingStore {
        async fn create_registration(
            &self,
            registration: &NewRegistration,
        ) -> EnrollResult<Option<StoredRegistration>> {
            self.inserted.lock().unwrap().push(registration.clone());
            Ok(Some(StoredRegistration::with_id(RecordId::Int(1))))
        }

        async fn link_checkout(&self, _id: &RecordId, _session_id: &str) -> EnrollResult<()> {
            self.links.fetch_add(1, Ordering::SeqCst);
            Err(EnrollError::StorageUnreachable("connection reset".into()))
        }

        fn backend_name(&self) -> &'static str {
            "memory"
        }
    }

    #[derive(Default)]
    struct RecordingGateway {
        requests: Mutex<Vec<CheckoutRequest>>,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_checkout(
            &self,
            request: &CheckoutRequest,
        ) -> EnrollResult<CheckoutSession> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(CheckoutSession {
                id: Some("pref-1".into()),
                checkout_url: "https://pay.test/pref-1".into(),
                provider: "memory".into(),
            })
        }

        fn provider_name(&self) -> &'static str {
            "memory"
        }
    }

    fn state() -> (AppState, Arc<RecordingStore>, Arc<RecordingGateway>) {
        let store = Arc::new(RecordingStore::default());
        let gateway = Arc::new(RecordingGateway::default());
        let state = AppState::with_backends(
            AppConfig::default(),
            PriceTable::default(),
            Backends::new(
                store.clone(),
                gateway.clone(),
                BackUrls::from_site("https://site.test"),
            ),
        );
        (state, store, gateway)
    }

    const ANA: &str = r#"{"nome":"Ana","whatsapp":"+5511999999999","email":"ana@x.com","curso":"Python","modulo":"Avançado"}"#;

    #[tokio::test]
    async fn test_link_failure_does_not_fail_registration() {
        let (state, store, gateway) = state();

        let session = process_registration(&state, &Method::POST, ANA.as_bytes())
            .await
            .unwrap();

        assert_eq!(session.checkout_url, "https://pay.test/pref-1");
        assert_eq!(store.links.load(Ordering::SeqCst), 1);

        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted[0].price, Price::whole(90));

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests[0].title, "Python – Avançado");
        assert_eq!(requests[0].external_reference.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_method_checked_before_body() {
        let (state, store, _gateway) = state();

        let err = process_registration(&state, &Method::GET, ANA.as_bytes())
            .await
            .unwrap_err();

        assert!(matches!(err, EnrollError::MethodNotAllowed { .. }));
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_incomplete_data() {
        let (state, store, _gateway) = state();

        let err = process_registration(&state, &Method::POST, b"{nome: Ana")
            .await
            .unwrap_err();

        assert!(matches!(err, EnrollError::IncompleteData { ref missing } if missing.len() == 5));
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_array_body_is_incomplete_data() {
        let (state, store, gateway) = state();
        let body = r#"["Ana","+5511999999999","ana@x.com","Python","Básico"]"#;

        let err = process_registration(&state, &Method::POST, body.as_bytes())
            .await
            .unwrap_err();

        assert!(matches!(err, EnrollError::IncompleteData { ref missing } if missing.len() == 5));
        assert!(store.inserted.lock().unwrap().is_empty());
        assert!(gateway.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_error_response_body() {
        let err = EnrollError::InvalidModule {
            received: json!("Expert"),
        };
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(body, json!({"error": "Módulo inválido", "received": "Expert"}));

        let err = EnrollError::MethodNotAllowed {
            method: "GET".into(),
        };
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(body, json!({"error": "Método não permitido. Use POST."}));
    }

    #[test]
    fn test_error_response_status() {
        let response = error_response(&EnrollError::Configuration("SITE_URL not set".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = error_response(&EnrollError::IncompleteData {
            missing: vec!["nome"],
        });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_panic_response() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_with_details() {
        let err = EnrollError::StorageRejected {
            status: 409,
            details: json!({"code": "23505"}),
        };
        assert_eq!(
            serde_json::to_value(ErrorResponse::from(&err)).unwrap(),
            json!({"error": "Erro ao salvar inscrição no banco.", "details": {"code": "23505"}})
        );
    }
}
