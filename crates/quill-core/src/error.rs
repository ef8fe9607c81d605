//! Provisioning error surface.
//!
//! A single tagged error type carrying a closed [`ProvisionErrorKind`] plus
//! structured fields, replacing dispatch over an exception hierarchy. The
//! boundary layer dispatches on the kind; the kind fixes the surfaced HTTP
//! status and stable error code.
//!
//! # Example
//!
//! ```
//! use quill_core::{ProvisionError, ProvisionErrorKind};
//!
//! let err = ProvisionError::user_not_found("42");
//! assert_eq!(err.kind, ProvisionErrorKind::UserNotFound);
//! assert_eq!(err.kind.status(), 404);
//! ```

use serde::Serialize;
use thiserror::Error;

/// Closed set of provisioning failure kinds.
///
/// Each kind fixes the HTTP status surfaced at the boundary and a stable
/// machine-readable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionErrorKind {
    /// Malformed input, rejected before any remote call.
    ValidationFailed,
    /// Username or email already taken, upstream or locally.
    DuplicateAccount,
    /// Lookup miss at the identity provider.
    AccountNotFound,
    /// Lookup miss at the local store.
    UserNotFound,
    /// Caller lacks the role required for the operation.
    AccessDenied,
    /// Policy violation: self or root enable/disable/delete.
    OperationNotPermitted,
    /// Transport or remote-system failure; retryable by the caller.
    ProviderUnavailable,
    /// A compensating action failed after a primary step failed.
    /// Requires manual reconciliation.
    PartialProvisioningFailure,
}

impl ProvisionErrorKind {
    /// HTTP status surfaced for this kind.
    #[must_use]
    pub fn status(self) -> u16 {
        match self {
            ProvisionErrorKind::ValidationFailed
            | ProvisionErrorKind::OperationNotPermitted => 400,
            ProvisionErrorKind::AccessDenied => 403,
            ProvisionErrorKind::AccountNotFound | ProvisionErrorKind::UserNotFound => 404,
            ProvisionErrorKind::DuplicateAccount => 409,
            ProvisionErrorKind::ProviderUnavailable
            | ProvisionErrorKind::PartialProvisioningFailure => 500,
        }
    }

    /// Stable machine-readable code for this kind.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            ProvisionErrorKind::ValidationFailed => "VALIDATION_FAILED",
            ProvisionErrorKind::DuplicateAccount => "DUPLICATE_ACCOUNT",
            ProvisionErrorKind::AccountNotFound => "ACCOUNT_NOT_FOUND",
            ProvisionErrorKind::UserNotFound => "USER_NOT_FOUND",
            ProvisionErrorKind::AccessDenied => "ACCESS_DENIED",
            ProvisionErrorKind::OperationNotPermitted => "OPERATION_NOT_PERMITTED",
            ProvisionErrorKind::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            ProvisionErrorKind::PartialProvisioningFailure => "PARTIAL_PROVISIONING_FAILURE",
        }
    }
}

/// Provisioning error: a kind plus structured context.
///
/// `args` holds the operation-specific values the message was built from
/// (usernames, field names, both causes of a partial failure), so boundary
/// layers can render them without parsing the message.
#[derive(Debug, Error)]
#[error("{}: {message}", .kind.code())]
pub struct ProvisionError {
    /// The failure kind; fixes status and code.
    pub kind: ProvisionErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Structured message arguments.
    pub args: Vec<String>,
    /// Underlying cause, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProvisionError {
    /// Create an error of the given kind with a message and no arguments.
    pub fn new(kind: ProvisionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            args: Vec::new(),
            source: None,
        }
    }

    /// Attach structured message arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Input validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ProvisionErrorKind::ValidationFailed, message)
    }

    /// Uniqueness conflict for the given identifier.
    pub fn duplicate_account(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self::new(
            ProvisionErrorKind::DuplicateAccount,
            format!("account already exists: {identifier}"),
        )
        .with_args(vec![identifier])
    }

    /// Provider-side lookup miss.
    pub fn account_not_found(username: impl Into<String>) -> Self {
        let username = username.into();
        Self::new(
            ProvisionErrorKind::AccountNotFound,
            format!("no identity provider account for '{username}'"),
        )
        .with_args(vec![username])
    }

    /// Local lookup miss.
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self::new(
            ProvisionErrorKind::UserNotFound,
            format!("user not found: {identifier}"),
        )
        .with_args(vec![identifier])
    }

    /// Caller lacks the required role.
    pub fn access_denied(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        Self::new(
            ProvisionErrorKind::AccessDenied,
            format!("caller is not permitted to {operation}"),
        )
        .with_args(vec![operation])
    }

    /// Policy violation (self or root lockout/unlock/delete).
    pub fn not_permitted(message: impl Into<String>) -> Self {
        Self::new(ProvisionErrorKind::OperationNotPermitted, message)
    }

    /// Transport or remote-system failure.
    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        Self::new(ProvisionErrorKind::ProviderUnavailable, message)
    }

    /// Compensation failed after a primary failure; carries both causes.
    ///
    /// The original failure becomes the source chain; both renderings are
    /// kept in `args` for the boundary layer.
    #[must_use]
    pub fn partial_provisioning(original: ProvisionError, compensation: ProvisionError) -> Self {
        let args = vec![original.to_string(), compensation.to_string()];
        Self::new(
            ProvisionErrorKind::PartialProvisioningFailure,
            format!(
                "compensation failed after primary failure: primary: {original}; compensation: {compensation}"
            ),
        )
        .with_args(args)
        .with_source(original)
    }

    /// Whether the caller may safely re-invoke the failed operation.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind == ProvisionErrorKind::ProviderUnavailable
    }
}

/// Type alias for Results using [`ProvisionError`].
pub type Result<T> = std::result::Result<T, ProvisionError>;
