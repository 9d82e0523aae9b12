//! # enroll-supabase
//!
//! Supabase (PostgREST) registration store for enroll-checkout-rs.
//!
//! ```rust,ignore
//! use enroll_supabase::SupabaseStore;
//! use enroll_core::RegistrationStore;
//!
//! let store = SupabaseStore::from_env()?;
//! let stored = store.create_registration(&registration).await?;
//! ```

pub mod config;
pub mod store;

// Re-exports
pub use config::{SupabaseConfig, REQUIRED_ENV};
pub use store::SupabaseStore;
