//! Token verification and authorization context for Quill.
//!
//! This crate provides:
//! - JWT RS256 decoding of the identity provider's access tokens
//! - The claim shapes the subsystem consumes (`sub`, `preferred_username`,
//!   `email`, nested `realm_access.roles`)
//! - The per-request [`AuthContext`] projection passed explicitly into
//!   every orchestrator operation
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_auth::{decode_token, AuthContext};
//!
//! let claims = decode_token(&token, public_key_pem)?;
//! let ctx = AuthContext::from_claims(&claims)?;
//! if ctx.is_admin() {
//!     // admin-only path
//! }
//! ```

mod claims;
mod context;
mod error;
mod jwt;

// Re-export public API
pub use claims::{RealmAccess, TokenClaims};
pub use context::AuthContext;
pub use error::AuthError;
pub use jwt::{decode_token, decode_token_with_config, encode_token, ValidationConfig};
