//! # Provisioning orchestrator
//!
//! The saga coordinator of the Quill identity subsystem: creating,
//! deleting, enabling, and disabling a user account requires coordinated,
//! non-transactional writes across the identity provider and the local
//! user store. This crate owns those workflows and issues compensating
//! actions on partial failure.
//!
//! ## Crate organization
//!
//! - [`orchestrator`] - The [`ProvisioningOrchestrator`] workflows
//! - [`saga`] - The explicit two-phase compensation helper
//! - [`requests`] - Request/response types and the merged user view
//! - [`validation`] - Local input validation, applied before any remote call
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quill_provisioning::{CreateUserRequest, ProvisioningOrchestrator};
//!
//! let orchestrator = ProvisioningOrchestrator::new(idp_client, user_store);
//! orchestrator.reconcile_from_idp().await?;
//!
//! let view = orchestrator.create_user(&request).await?;
//! println!("provisioned {} as {}", view.username, view.external_id);
//! ```

pub mod orchestrator;
pub mod requests;
pub mod saga;
pub mod validation;

pub use orchestrator::ProvisioningOrchestrator;
pub use requests::{
    CreateUserRequest, ReconcileReport, UpdateProfileRequest, UserPageView, UserView,
};
pub use saga::{with_compensation, SagaFailure};
