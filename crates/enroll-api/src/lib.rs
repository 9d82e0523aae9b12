//! # enroll-api
//!
//! HTTP API layer for enroll-checkout-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The registration endpoint that stores a signup and opens a checkout
//! - Module price listing
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/inscricao` | Register, returns `{checkoutUrl}` |
//! | POST | `/.netlify/functions/inscricao` | Same, legacy form path |
//! | GET | `/api/modulos` | Module prices |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, Backends};
