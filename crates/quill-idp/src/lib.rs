//! # Identity provider client contract
//!
//! Core abstractions for driving the external identity provider that owns
//! credentials and realm roles for Quill accounts.
//!
//! The contract is a capability set: one async trait method per remote
//! operation the provisioning orchestrator needs. Implementations live in
//! sibling crates (one per supported provider); the orchestrator only sees
//! [`IdentityProviderClient`].
//!
//! Every mutating call is non-transactional and partially observable - a
//! transport failure after the provider applied a change is
//! indistinguishable from one before. Callers must therefore never assume
//! that an unconfirmed call had no effect, and compensating actions are
//! expressed idempotently (delete-if-exists, set-to-value).
//!
//! ## Crate organization
//!
//! - [`account`] - Provider-side account types ([`IdpAccount`], [`NewAccount`])
//! - [`error`] - Error taxonomy with transient/permanent classification
//! - [`client`] - The [`IdentityProviderClient`] capability trait

pub mod account;
pub mod client;
pub mod error;

pub use account::{IdpAccount, NewAccount};
pub use client::IdentityProviderClient;
pub use error::{IdpError, IdpResult};

// Re-export async_trait for client implementors
pub use async_trait::async_trait;
