//! Service credential handling for the Keycloak admin API.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use quill_idp::{IdpError, IdpResult};

/// Token response from the realm token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[allow(dead_code)]
    token_type: String,
}

/// Cached service access token.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// True if the token is expired or expires within the grace period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Cache for the `client_credentials` service token.
///
/// Acquires a token on demand and refreshes it once it is inside the
/// grace period before expiry.
#[derive(Debug)]
pub struct TokenCache {
    http_client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    cached_token: RwLock<Option<CachedToken>>,
    grace_period: Duration,
}

impl TokenCache {
    /// Create a token cache against the given token endpoint.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: SecretString,
    ) -> Self {
        Self {
            http_client,
            token_url,
            client_id,
            client_secret,
            cached_token: RwLock::new(None),
            grace_period: Duration::seconds(30),
        }
    }

    /// Get a valid access token, refreshing if necessary.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> IdpResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    debug!("using cached service token");
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("refreshing service token");
        let new_token = self.acquire_token().await?;

        let access_token = new_token.access_token.clone();
        {
            let mut cache = self.cached_token.write().await;
            *cache = Some(new_token);
        }

        Ok(access_token)
    }

    /// Acquire a new token with the client-credentials grant.
    async fn acquire_token(&self) -> IdpResult<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", &self.client_id),
            ("client_secret", self.client_secret.expose_secret()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| IdpError::AuthenticationFailed {
                message: format!("token request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(IdpError::AuthenticationFailed {
                message: format!("token endpoint answered {status}"),
            });
        }

        let token_response: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| IdpError::AuthenticationFailed {
                    message: format!("malformed token response: {e}"),
                })?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);
        debug!(%expires_at, "acquired service token");

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }

    /// Drop the cached token, forcing a refresh on next use.
    pub async fn invalidate(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }
}
