//! Shared token handling for blog services.
//!
//! Only JWT validation lives here; issuing tokens in production is the job of
//! the external identity provider.
pub mod jwt;
