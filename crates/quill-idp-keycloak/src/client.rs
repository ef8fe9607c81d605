//! Keycloak admin REST client.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info, instrument, warn};

use quill_core::UserRole;
use quill_idp::{IdentityProviderClient, IdpAccount, IdpError, IdpResult, NewAccount};

use crate::config::KeycloakConfig;
use crate::token::TokenCache;
use crate::wire::{
    CredentialRepresentation, RoleRepresentation, UserRepresentation, VERIFY_EMAIL_ACTION,
};

/// Keycloak-backed [`IdentityProviderClient`].
///
/// Every request is a single attempt; failures surface to the caller
/// unchanged. Transport timeouts belong to the underlying HTTP client,
/// configured from [`KeycloakConfig::request_timeout_secs`].
#[derive(Debug)]
pub struct KeycloakClient {
    config: KeycloakConfig,
    http_client: reqwest::Client,
    tokens: TokenCache,
}

impl KeycloakClient {
    /// Create a client for the configured realm.
    ///
    /// # Errors
    ///
    /// `IdpError::InvalidConfiguration` when the config does not validate
    /// or the HTTP client cannot be built.
    pub fn new(config: KeycloakConfig) -> IdpResult<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| IdpError::InvalidConfiguration {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        let tokens = TokenCache::new(
            http_client.clone(),
            config.token_url(),
            config.client_id.clone(),
            config.client_secret.clone(),
        );

        Ok(Self {
            config,
            http_client,
            tokens,
        })
    }

    fn admin_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.admin_base())
    }

    /// Issue an authenticated request and map the transport layer's errors.
    async fn send(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> IdpResult<reqwest::Response> {
        let token = self.tokens.get_token().await?;

        let mut request = self.http_client.request(method, url).bearer_auth(&token);
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| IdpError::unavailable_with_source("transport failure", e))
    }

    /// Map a non-success admin API status to the error taxonomy.
    fn map_status(status: StatusCode, operation: &str, identifier: &str) -> IdpError {
        match status {
            StatusCode::CONFLICT => IdpError::duplicate(identifier),
            StatusCode::FORBIDDEN => IdpError::AccessDenied {
                operation: operation.to_string(),
            },
            StatusCode::UNAUTHORIZED => IdpError::AuthenticationFailed {
                message: format!("provider rejected the service credential during {operation}"),
            },
            StatusCode::NOT_FOUND => IdpError::not_found(identifier),
            s if s.is_server_error() => {
                IdpError::unavailable(format!("provider answered {s} during {operation}"))
            }
            s => IdpError::protocol(format!("unexpected status {s} during {operation}")),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        operation: &str,
        identifier: &str,
    ) -> IdpResult<T> {
        let response = self.send(reqwest::Method::GET, url, None).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_status(status, operation, identifier));
        }
        response
            .json()
            .await
            .map_err(|e| IdpError::protocol(format!("malformed response during {operation}: {e}")))
    }

    /// Best-effort removal of a just-created account after a failed
    /// post-creation step. The outcome is logged either way; the original
    /// failure is what surfaces to the caller.
    async fn rollback_created_account(&self, external_id: &str, username: &str) {
        let url = self.admin_url(&format!("/users/{external_id}"));
        match self.send(reqwest::Method::DELETE, &url, None).await {
            Ok(response) if response.status().is_success() => {
                info!(username, external_id, "rolled back partially created account");
            }
            Ok(response) => {
                warn!(
                    username,
                    external_id,
                    status = %response.status(),
                    "rollback of partially created account was refused"
                );
            }
            Err(err) => {
                warn!(
                    username,
                    external_id,
                    error = %err,
                    "rollback of partially created account failed"
                );
            }
        }
    }

    /// Fetch the realm roles matching the requested application roles.
    async fn realm_roles_by_name(&self, roles: &[UserRole]) -> IdpResult<Vec<RoleRepresentation>> {
        let all: Vec<RoleRepresentation> = self
            .get_json(&self.admin_url("/roles"), "list realm roles", "realm")
            .await?;

        let mut matched = Vec::with_capacity(roles.len());
        for role in roles {
            let found = all
                .iter()
                .find(|r| r.name == role.as_str())
                .ok_or_else(|| IdpError::RoleNotFound {
                    role: role.as_str().to_string(),
                })?;
            matched.push(found.clone());
        }
        Ok(matched)
    }

    /// Trigger the provider's verification email for an account id.
    async fn send_verify_email_by_id(&self, external_id: &str) -> IdpResult<()> {
        let url = self.admin_url(&format!("/users/{external_id}/send-verify-email"));
        let response = self.send(reqwest::Method::PUT, &url, None).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_status(status, "send verification email", external_id));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProviderClient for KeycloakClient {
    fn name(&self) -> &str {
        &self.config.idp_name
    }

    #[instrument(skip(self, profile), fields(username = %profile.username))]
    async fn create_account(
        &self,
        profile: &NewAccount,
        desired_role: UserRole,
    ) -> IdpResult<String> {
        info!(role = %desired_role, "creating provider account");

        let representation = UserRepresentation {
            id: None,
            username: profile.username.clone(),
            email: Some(profile.email.clone()),
            first_name: Some(profile.first_name.clone()),
            last_name: Some(profile.last_name.clone()),
            enabled: Some(true),
            email_verified: Some(false),
            credentials: vec![CredentialRepresentation::password(&profile.password)],
            required_actions: vec![VERIFY_EMAIL_ACTION.to_string()],
        };
        let body = serde_json::to_value(&representation)
            .map_err(|e| IdpError::protocol(format!("failed to encode account: {e}")))?;

        let response = self
            .send(reqwest::Method::POST, &self.admin_url("/users"), Some(&body))
            .await?;
        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(Self::map_status(status, "create account", &profile.username));
        }

        // The created account's id only appears in the Location header.
        let external_id = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|loc| loc.rsplit('/').next())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                IdpError::protocol("creation response carried no Location header".to_string())
            })?;

        debug!(%external_id, "provider account created");

        if let Err(err) = self
            .assign_realm_roles(&external_id, &[desired_role])
            .await
        {
            warn!(error = %err, "role assignment failed after creation");
            self.rollback_created_account(&external_id, &profile.username)
                .await;
            return Err(err);
        }

        if let Err(err) = self.send_verify_email_by_id(&external_id).await {
            warn!(error = %err, "verification email failed after creation");
            self.rollback_created_account(&external_id, &profile.username)
                .await;
            return Err(err);
        }

        info!(%external_id, "provider account fully provisioned");
        Ok(external_id)
    }

    #[instrument(skip(self))]
    async fn delete_account(&self, username: &str) -> IdpResult<()> {
        let external_id = self.resolve_id_by_username(username).await?;

        let url = self.admin_url(&format!("/users/{external_id}"));
        let response = self.send(reqwest::Method::DELETE, &url, None).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_status(status, "delete account", username));
        }

        info!(username, %external_id, "provider account deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_enabled(&self, external_id: &str, enabled: bool) -> IdpResult<()> {
        let url = self.admin_url(&format!("/users/{external_id}"));

        let mut representation: UserRepresentation = self
            .get_json(&url, "fetch account", external_id)
            .await?;
        representation.enabled = Some(enabled);

        let body = serde_json::to_value(&representation)
            .map_err(|e| IdpError::protocol(format!("failed to encode account: {e}")))?;
        let response = self.send(reqwest::Method::PUT, &url, Some(&body)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_status(status, "update enabled flag", external_id));
        }

        info!(external_id, enabled, "provider enabled flag updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn assign_realm_roles(&self, external_id: &str, roles: &[UserRole]) -> IdpResult<()> {
        let matched = self.realm_roles_by_name(roles).await?;

        let url = self.admin_url(&format!("/users/{external_id}/role-mappings/realm"));
        let body = serde_json::to_value(&matched)
            .map_err(|e| IdpError::protocol(format!("failed to encode roles: {e}")))?;
        let response = self.send(reqwest::Method::POST, &url, Some(&body)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_status(status, "assign realm roles", external_id));
        }

        debug!(external_id, ?roles, "realm roles assigned");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_accounts(&self) -> IdpResult<Vec<IdpAccount>> {
        let representations: Vec<UserRepresentation> = self
            .get_json(&self.admin_url("/users"), "list accounts", "realm")
            .await?;

        let mut accounts = Vec::with_capacity(representations.len());
        for rep in representations {
            let Some(external_id) = rep.id else {
                continue;
            };

            let roles: Vec<RoleRepresentation> = self
                .get_json(
                    &self.admin_url(&format!("/users/{external_id}/role-mappings/realm")),
                    "fetch role mappings",
                    &external_id,
                )
                .await?;

            accounts.push(IdpAccount {
                external_id,
                username: rep.username,
                email: rep.email.unwrap_or_default(),
                first_name: rep.first_name.unwrap_or_default(),
                last_name: rep.last_name.unwrap_or_default(),
                enabled: rep.enabled.unwrap_or(false),
                email_verified: rep.email_verified.unwrap_or(false),
                realm_roles: roles.into_iter().map(|r| r.name).collect(),
            });
        }

        debug!(count = accounts.len(), "listed provider accounts");
        Ok(accounts)
    }

    #[instrument(skip(self))]
    async fn resolve_id_by_username(&self, username: &str) -> IdpResult<String> {
        let url = format!(
            "{}/users?username={username}&exact=true",
            self.config.admin_base()
        );
        let matches: Vec<UserRepresentation> = self
            .get_json(&url, "search account", username)
            .await?;

        // Exact search returns zero or one match; never index blindly.
        match matches.into_iter().next().and_then(|rep| rep.id) {
            Some(id) => Ok(id),
            None => Err(IdpError::not_found(username)),
        }
    }

    #[instrument(skip(self))]
    async fn send_verify_email(&self, username: &str) -> IdpResult<()> {
        let external_id = self.resolve_id_by_username(username).await?;
        self.send_verify_email_by_id(&external_id).await?;
        info!(username, "verification email requested");
        Ok(())
    }
}
