//! Keycloak client configuration.

use quill_idp::IdpError;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

fn default_idp_name() -> String {
    "keycloak".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Connection settings for one Keycloak realm.
///
/// The client secret is held as a [`SecretString`] and never appears in
/// Debug output or logs.
#[derive(Debug, Clone, Deserialize)]
pub struct KeycloakConfig {
    /// Base server URL, e.g. `https://idp.example.com`.
    pub server_url: String,
    /// Realm holding the application's accounts.
    pub realm: String,
    /// Service client id with provisioning rights.
    pub client_id: String,
    /// Service client secret.
    pub client_secret: SecretString,
    /// Provider name used in logs.
    #[serde(default = "default_idp_name")]
    pub idp_name: String,
    /// Transport timeout; the orchestrator defines no timeouts of its own.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl KeycloakConfig {
    /// Create a config with default name and timeout.
    #[must_use]
    pub fn new(
        server_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            idp_name: default_idp_name(),
            request_timeout_secs: default_timeout(),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// `IdpError::InvalidConfiguration` when a field is empty or the
    /// server URL does not parse.
    pub fn validate(&self) -> Result<(), IdpError> {
        if url::Url::parse(&self.server_url).is_err() {
            return Err(IdpError::InvalidConfiguration {
                message: format!("server_url is not a valid URL: {}", self.server_url),
            });
        }
        if self.realm.is_empty() {
            return Err(IdpError::InvalidConfiguration {
                message: "realm must not be empty".to_string(),
            });
        }
        if self.client_id.is_empty() {
            return Err(IdpError::InvalidConfiguration {
                message: "client_id must not be empty".to_string(),
            });
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err(IdpError::InvalidConfiguration {
                message: "client_secret must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Admin REST base for the configured realm.
    #[must_use]
    pub fn admin_base(&self) -> String {
        format!(
            "{}/admin/realms/{}",
            self.server_url.trim_end_matches('/'),
            self.realm
        )
    }

    /// OpenID Connect token endpoint for the configured realm.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.server_url.trim_end_matches('/'),
            self.realm
        )
    }
}
