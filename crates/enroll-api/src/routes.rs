//! # Routes
//!
//! Axum router configuration for the registration API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::{any, get},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - POST /api/inscricao - Register and get a checkout URL
/// - POST /.netlify/functions/inscricao - Same handler, path the site form posts to
/// - GET  /api/modulos - Module prices
/// - GET  /health - Health check
///
/// Any other method on the registration paths gets a JSON 405.
pub fn create_router(state: AppState) -> Router {
    // The form is served from the site's own domain, which is not known here
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/inscricao", any(handlers::register))
        .route("/modulos", get(handlers::list_modules));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api", api_routes)
        .route("/.netlify/functions/inscricao", any(handlers::register))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        // State
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::{body::Body, http::Request, http::StatusCode};
    use enroll_core::PriceTable;
    use tower::ServiceExt;

    fn unconfigured() -> Router {
        create_router(AppState::unconfigured(
            AppConfig::default(),
            PriceTable::default(),
            "missing environment variables: SITE_URL",
        ))
    }

    #[tokio::test]
    async fn test_health() {
        let response = unconfigured()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_registration_paths_reject_other_methods() {
        for path in ["/api/inscricao", "/.netlify/functions/inscricao"] {
            for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
                let response = unconfigured()
                    .oneshot(
                        Request::builder()
                            .method(method.clone())
                            .uri(path)
                            .body(Body::empty())
                            .unwrap(),
                    )
                    .await
                    .unwrap();

                assert_eq!(
                    response.status(),
                    StatusCode::METHOD_NOT_ALLOWED,
                    "{} {}",
                    method,
                    path
                );
                assert_eq!(
                    response.headers()[header::CONTENT_TYPE],
                    "application/json"
                );
            }
        }
    }
}
