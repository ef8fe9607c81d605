//! Identity provider error taxonomy.
//!
//! Error definitions with transient/permanent classification. Transient
//! errors surface as `ProviderUnavailable` and are retryable by the
//! caller; nothing inside the subsystem retries automatically.

use quill_core::ProvisionError;
use thiserror::Error;

/// Error that can occur while driving the identity provider.
#[derive(Debug, Error)]
pub enum IdpError {
    /// Username or email already exists upstream (create conflict).
    #[error("account already exists: {identifier}")]
    DuplicateAccount { identifier: String },

    /// No account matched the lookup.
    #[error("account not found: {username}")]
    AccountNotFound { username: String },

    /// The calling credential lacks rights for the operation.
    #[error("access denied: provider refused {operation}")]
    AccessDenied { operation: String },

    /// A realm role requested by name does not exist upstream.
    #[error("realm role not found: {role}")]
    RoleNotFound { role: String },

    /// Acquiring or refreshing the service credential failed.
    #[error("provider authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Transport failure or provider-side 5xx.
    #[error("provider unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The provider answered with something the client cannot interpret.
    #[error("unexpected provider response: {message}")]
    Protocol { message: String },

    /// Client configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl IdpError {
    /// Check if this error is transient and the caller may retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, IdpError::Unavailable { .. })
    }

    /// Check if this error is permanent and retry won't help.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            IdpError::DuplicateAccount { .. } => "DUPLICATE_ACCOUNT",
            IdpError::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            IdpError::AccessDenied { .. } => "ACCESS_DENIED",
            IdpError::RoleNotFound { .. } => "ROLE_NOT_FOUND",
            IdpError::AuthenticationFailed { .. } => "AUTH_FAILED",
            IdpError::Unavailable { .. } => "PROVIDER_UNAVAILABLE",
            IdpError::Protocol { .. } => "PROTOCOL_ERROR",
            IdpError::InvalidConfiguration { .. } => "INVALID_CONFIG",
        }
    }

    // Convenience constructors

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        IdpError::Unavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Create an unavailable error with source.
    pub fn unavailable_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        IdpError::Unavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a duplicate-account error.
    pub fn duplicate(identifier: impl Into<String>) -> Self {
        IdpError::DuplicateAccount {
            identifier: identifier.into(),
        }
    }

    /// Create an account-not-found error.
    pub fn not_found(username: impl Into<String>) -> Self {
        IdpError::AccountNotFound {
            username: username.into(),
        }
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        IdpError::Protocol {
            message: message.into(),
        }
    }
}

impl From<IdpError> for ProvisionError {
    fn from(err: IdpError) -> Self {
        match err {
            IdpError::DuplicateAccount { ref identifier } => {
                ProvisionError::duplicate_account(identifier.clone()).with_source(err)
            }
            IdpError::AccountNotFound { ref username } => {
                ProvisionError::account_not_found(username.clone()).with_source(err)
            }
            IdpError::AccessDenied { ref operation } => {
                ProvisionError::access_denied(operation.clone()).with_source(err)
            }
            IdpError::RoleNotFound { .. }
            | IdpError::AuthenticationFailed { .. }
            | IdpError::Unavailable { .. }
            | IdpError::Protocol { .. }
            | IdpError::InvalidConfiguration { .. } => {
                ProvisionError::provider_unavailable(err.to_string()).with_source(err)
            }
        }
    }
}

/// Result type for identity provider operations.
pub type IdpResult<T> = Result<T, IdpError>;
