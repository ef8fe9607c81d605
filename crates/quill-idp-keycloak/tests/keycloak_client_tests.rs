//! Integration tests for the Keycloak client against a wiremock server.
//!
//! Covers account creation (including the Location-header id extraction
//! and post-creation rollback), exact search, deletion, enable toggling,
//! and the status-to-error mapping.

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quill_core::UserRole;
use quill_idp::{IdentityProviderClient, IdpError, NewAccount};
use quill_idp_keycloak::{KeycloakClient, KeycloakConfig};

const REALM: &str = "blog";

async fn setup() -> (MockServer, KeycloakClient) {
    let server = MockServer::start().await;

    // Every test needs the client-credentials token endpoint.
    Mock::given(method("POST"))
        .and(path(format!("/realms/{REALM}/protocol/openid-connect/token")))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "service-token",
            "expires_in": 300,
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;

    let config = KeycloakConfig::new(server.uri(), REALM, "blog-client", "s3cret");
    let client = KeycloakClient::new(config).unwrap();
    (server, client)
}

fn alice_profile() -> NewAccount {
    NewAccount {
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        first_name: "Alice".to_string(),
        last_name: "Doe".to_string(),
        password: "correct horse battery staple".to_string(),
    }
}

fn admin(p: &str) -> String {
    format!("/admin/realms/{REALM}{p}")
}

async fn mount_role_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(admin("/roles")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "r-user", "name": "USER"},
            {"id": "r-admin", "name": "ADMIN"},
            {"id": "r-root", "name": "ROOT"}
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn create_account_returns_id_from_location_header() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(admin("/users")))
        .respond_with(ResponseTemplate::new(201).insert_header(
            "Location",
            format!("{}/admin/realms/{REALM}/users/abc-123", server.uri()).as_str(),
        ))
        .mount(&server)
        .await;
    mount_role_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path(admin("/users/abc-123/role-mappings/realm")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(admin("/users/abc-123/send-verify-email")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let external_id = client
        .create_account(&alice_profile(), UserRole::User)
        .await
        .unwrap();
    assert_eq!(external_id, "abc-123");
}

#[tokio::test]
async fn create_account_conflict_maps_to_duplicate() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(admin("/users")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "errorMessage": "User exists with same username"
        })))
        .mount(&server)
        .await;

    let err = client
        .create_account(&alice_profile(), UserRole::User)
        .await
        .unwrap_err();
    assert!(matches!(err, IdpError::DuplicateAccount { .. }), "got {err}");
}

#[tokio::test]
async fn create_account_forbidden_maps_to_access_denied() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(admin("/users")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client
        .create_account(&alice_profile(), UserRole::User)
        .await
        .unwrap_err();
    assert!(matches!(err, IdpError::AccessDenied { .. }), "got {err}");
}

#[tokio::test]
async fn create_account_rolls_back_when_role_is_missing() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(admin("/users")))
        .respond_with(ResponseTemplate::new(201).insert_header(
            "Location",
            format!("{}/admin/realms/{REALM}/users/doomed-1", server.uri()).as_str(),
        ))
        .mount(&server)
        .await;
    // Realm has no matching role.
    Mock::given(method("GET"))
        .and(path(admin("/roles")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "r-other", "name": "offline_access"}
        ])))
        .mount(&server)
        .await;
    // The client must delete the account it just created.
    let rollback = Mock::given(method("DELETE"))
        .and(path(admin("/users/doomed-1")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .named("rollback delete");
    server.register(rollback).await;

    let err = client
        .create_account(&alice_profile(), UserRole::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, IdpError::RoleNotFound { .. }), "got {err}");

    // Expectation on the rollback mock is verified on drop.
}

#[tokio::test]
async fn resolve_id_uses_exact_search() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(admin("/users")))
        .and(query_param("username", "alice"))
        .and(query_param("exact", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "abc-123", "username": "alice"}
        ])))
        .mount(&server)
        .await;

    let id = client.resolve_id_by_username("alice").await.unwrap();
    assert_eq!(id, "abc-123");
}

#[tokio::test]
async fn resolve_id_of_unknown_user_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(admin("/users")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = client.resolve_id_by_username("ghost").await.unwrap_err();
    assert!(matches!(err, IdpError::AccountNotFound { .. }), "got {err}");
}

#[tokio::test]
async fn delete_account_resolves_then_deletes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(admin("/users")))
        .and(query_param("username", "bob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "bob-1", "username": "bob"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(admin("/users/bob-1")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_account("bob").await.unwrap();
}

#[tokio::test]
async fn set_enabled_round_trips_the_representation() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(admin("/users/bob-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "bob-1",
            "username": "bob",
            "email": "bob@example.com",
            "enabled": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(admin("/users/bob-1")))
        .and(body_string_contains("\"enabled\":false"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.set_enabled("bob-1", false).await.unwrap();
}

#[tokio::test]
async fn server_errors_are_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(admin("/users")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.resolve_id_by_username("alice").await.unwrap_err();
    assert!(err.is_transient(), "expected transient, got {err}");
}

#[tokio::test]
async fn list_accounts_resolves_realm_roles() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(admin("/users")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a-1", "username": "alice", "email": "alice@example.com",
             "firstName": "Alice", "lastName": "Doe",
             "enabled": true, "emailVerified": true},
            {"id": "b-1", "username": "bob", "email": "bob@example.com",
             "enabled": false}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(admin("/users/a-1/role-mappings/realm")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "r-admin", "name": "ADMIN"},
            {"id": "r-oa", "name": "offline_access"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(admin("/users/b-1/role-mappings/realm")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let accounts = client.list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 2);

    let alice = accounts.iter().find(|a| a.username == "alice").unwrap();
    assert_eq!(alice.external_id, "a-1");
    assert_eq!(alice.primary_role(), Some(UserRole::Admin));
    assert!(alice.enabled);

    let bob = accounts.iter().find(|a| a.username == "bob").unwrap();
    assert!(!bob.enabled);
    assert_eq!(bob.primary_role(), None);
}

#[tokio::test]
async fn send_verify_email_targets_resolved_account() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(admin("/users")))
        .and(query_param("username", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a-1", "username": "alice"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(admin("/users/a-1/send-verify-email")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.send_verify_email("alice").await.unwrap();
}
