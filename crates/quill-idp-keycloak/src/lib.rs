//! Keycloak implementation of the Quill identity provider contract.
//!
//! Drives the Keycloak admin REST API: account creation with a single
//! non-temporary password credential and a mandatory verify-email action,
//! realm-role assignment by name lookup, exact search by username, enable
//! toggling, and realm listing for startup reconciliation.
//!
//! The client authenticates with the `client_credentials` grant against
//! the realm token endpoint and caches the service token until shortly
//! before expiry. It is constructed explicitly from a [`KeycloakConfig`]
//! and injected where needed - there is no process-global instance.
//!
//! # Example
//!
//! ```no_run
//! use quill_idp::IdentityProviderClient;
//! use quill_idp_keycloak::{KeycloakClient, KeycloakConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = KeycloakConfig::new(
//!     "https://idp.example.com",
//!     "blog",
//!     "blog-client",
//!     "client-secret",
//! );
//! let client = KeycloakClient::new(config)?;
//! let id = client.resolve_id_by_username("alice").await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod token;
mod wire;

pub use client::KeycloakClient;
pub use config::KeycloakConfig;
pub use token::TokenCache;
pub use wire::{CredentialRepresentation, RoleRepresentation, UserRepresentation};
