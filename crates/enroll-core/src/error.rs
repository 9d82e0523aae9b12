//! # Enrollment Error Types
//!
//! Typed error handling for the registration checkout flow.
//! Every operation returns `Result<T, EnrollError>`; the HTTP layer turns
//! the error into a JSON body using `status_code`, `public_message`,
//! `received` and `details`.

use serde_json::Value;
use thiserror::Error;

/// Coarse classification of an [`EnrollError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong HTTP verb
    Method,
    /// Caller sent incomplete or invalid data
    Validation,
    /// Deployment is missing configuration
    Configuration,
    /// Storage or payment backend failed
    Upstream,
    /// Anything else
    Internal,
}

/// Core error type for the registration checkout flow
#[derive(Debug, Error)]
pub enum EnrollError {
    /// Request used a method other than POST
    #[error("Method not allowed: {method}")]
    MethodNotAllowed { method: String },

    /// One or more required form fields are missing or empty
    #[error("Incomplete registration data, missing: {}", .missing.join(", "))]
    IncompleteData { missing: Vec<&'static str> },

    /// Module is not a key of the price table
    #[error("Invalid module: {received}")]
    InvalidModule { received: Value },

    /// Required environment configuration is absent or unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Storage backend answered with a non-success status
    #[error("Storage rejected request with HTTP {status}")]
    StorageRejected { status: u16, details: Value },

    /// Storage backend could not be reached
    #[error("Storage unreachable: {0}")]
    StorageUnreachable(String),

    /// Payment provider answered with a non-success status
    #[error("Payment provider rejected request with HTTP {status}")]
    PaymentRejected { status: u16, details: Value },

    /// Payment provider could not be reached
    #[error("Payment provider unreachable: {0}")]
    PaymentUnreachable(String),

    /// Payment provider answered 2xx but the body is unusable
    #[error("Unexpected payment provider response: {message}")]
    UnexpectedPaymentResponse { message: String, details: Value },

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EnrollError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnrollError::MethodNotAllowed { .. } => ErrorKind::Method,
            EnrollError::IncompleteData { .. } | EnrollError::InvalidModule { .. } => {
                ErrorKind::Validation
            }
            EnrollError::Configuration(_) => ErrorKind::Configuration,
            EnrollError::StorageRejected { .. }
            | EnrollError::StorageUnreachable(_)
            | EnrollError::PaymentRejected { .. }
            | EnrollError::PaymentUnreachable(_)
            | EnrollError::UnexpectedPaymentResponse { .. } => ErrorKind::Upstream,
            EnrollError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Method => 405,
            ErrorKind::Validation => 400,
            ErrorKind::Configuration | ErrorKind::Upstream | ErrorKind::Internal => 500,
        }
    }

    /// Message shown to the person filling in the form.
    pub fn public_message(&self) -> &'static str {
        match self {
            EnrollError::MethodNotAllowed { .. } => "Método não permitido. Use POST.",
            EnrollError::IncompleteData { .. } => "Dados incompletos",
            EnrollError::InvalidModule { .. } => "Módulo inválido",
            EnrollError::Configuration(_) => "Variáveis de ambiente não configuradas.",
            EnrollError::StorageRejected { .. } => "Erro ao salvar inscrição no banco.",
            EnrollError::StorageUnreachable(_) => "Falha ao conectar no Supabase.",
            EnrollError::PaymentRejected { .. } => "Erro ao criar checkout no Mercado Pago.",
            EnrollError::PaymentUnreachable(_) => "Falha ao conectar no Mercado Pago.",
            EnrollError::UnexpectedPaymentResponse { .. } => {
                "Resposta inesperada do Mercado Pago."
            }
            EnrollError::Internal(_) => "Erro interno",
        }
    }

    /// Value echoed back for validation errors
    pub fn received(&self) -> Option<&Value> {
        match self {
            EnrollError::InvalidModule { received } => Some(received),
            _ => None,
        }
    }

    /// Upstream or internal detail attached to 500 responses.
    ///
    /// Configuration errors carry none: variable names stay in the logs.
    pub fn details(&self) -> Option<Value> {
        match self {
            EnrollError::StorageRejected { details, .. }
            | EnrollError::PaymentRejected { details, .. }
            | EnrollError::UnexpectedPaymentResponse { details, .. } => Some(details.clone()),
            EnrollError::StorageUnreachable(message)
            | EnrollError::PaymentUnreachable(message)
            | EnrollError::Internal(message) => Some(Value::String(message.clone())),
            _ => None,
        }
    }
}

/// Result type alias for enrollment operations
pub type EnrollResult<T> = Result<T, EnrollError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            EnrollError::MethodNotAllowed {
                method: "GET".into()
            }
            .status_code(),
            405
        );
        assert_eq!(
            EnrollError::IncompleteData {
                missing: vec!["nome"]
            }
            .status_code(),
            400
        );
        assert_eq!(
            EnrollError::InvalidModule {
                received: json!("Expert")
            }
            .status_code(),
            400
        );
        assert_eq!(EnrollError::Configuration("x".into()).status_code(), 500);
        assert_eq!(
            EnrollError::PaymentUnreachable("timeout".into()).status_code(),
            500
        );
    }

    #[test]
    fn test_configuration_is_its_own_kind() {
        let config = EnrollError::Configuration("SITE_URL not set".into());
        let upstream = EnrollError::StorageRejected {
            status: 500,
            details: json!({}),
        };

        assert_eq!(config.kind(), ErrorKind::Configuration);
        assert_eq!(upstream.kind(), ErrorKind::Upstream);
        assert!(config.details().is_none());
    }

    #[test]
    fn test_received_and_details() {
        let err = EnrollError::InvalidModule {
            received: json!("Expert"),
        };
        assert_eq!(err.received(), Some(&json!("Expert")));
        assert!(err.details().is_none());

        let err = EnrollError::PaymentRejected {
            status: 401,
            details: json!({"message": "invalid access token"}),
        };
        assert_eq!(
            err.details(),
            Some(json!({"message": "invalid access token"}))
        );

        let err = EnrollError::StorageUnreachable("connection refused".into());
        assert_eq!(err.details(), Some(json!("connection refused")));
    }

    #[test]
    fn test_incomplete_data_display() {
        let err = EnrollError::IncompleteData {
            missing: vec!["nome", "email"],
        };
        assert_eq!(
            err.to_string(),
            "Incomplete registration data, missing: nome, email"
        );
    }
}
