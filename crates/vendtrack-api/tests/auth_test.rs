// Integration tests for login, bearer auth and the 401 refresh-and-retry.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vendtrack_api::{ApiClient, Error, LogoutReason, QueryParams, SessionState, TokenPair};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client =
        ApiClient::from_reqwest(&format!("{}/api", server.uri()), reqwest::Client::new()).unwrap();
    (server, client)
}

fn tokens(access: &str, refresh: &str) -> TokenPair {
    TokenPair {
        access: SecretString::from(access.to_owned()),
        refresh: SecretString::from(refresh.to_owned()),
    }
}

async fn mount_refresh(server: &MockServer, refresh: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(json!({ "refresh": refresh })))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_tokens_and_fetches_profile() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({ "username": "sam", "password": "hunter2" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access": "a1", "refresh": "r1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/profile/"))
        .and(header("Authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4, "username": "sam", "first_name": "Sam", "last_name": "Reyes"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = client.http().subscribe_session();
    let profile = client
        .http()
        .login("sam", &SecretString::from("hunter2".to_owned()))
        .await
        .unwrap();

    assert_eq!(profile.display_name(), "Sam Reyes");
    assert!(client.http().is_authenticated());
    assert_eq!(client.http().current_user().map(|u| u.id), Some(4));
    assert!(session.borrow().is_authenticated());
}

#[tokio::test]
async fn test_login_rejection_surfaces_detail() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let err = client
        .http()
        .login("sam", &SecretString::from("wrong".to_owned()))
        .await
        .unwrap_err();

    match err {
        Error::Authentication { message } => {
            assert_eq!(message, "No active account found with the given credentials");
        }
        other => panic!("expected Authentication, got {other:?}"),
    }
    assert!(!client.http().is_authenticated());
}

#[tokio::test]
async fn test_login_rejection_without_detail_uses_fallback() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client
        .http()
        .login("sam", &SecretString::from("pw".to_owned()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication { ref message } if message == "Login failed"));
}

#[tokio::test]
async fn test_logout_clears_tokens_and_returns_redirect() {
    let (_server, client) = setup().await;
    client.http().set_tokens(tokens("a1", "r1"));

    let redirect = client.http().logout();

    assert_eq!(redirect, "/home");
    assert!(!client.http().is_authenticated());
    assert_eq!(
        client.http().session_state(),
        SessionState::LoggedOut {
            redirect: "/home".into(),
            reason: LogoutReason::UserRequested,
        }
    );
}

// ── Refresh and retry ───────────────────────────────────────────────

#[tokio::test]
async fn test_401_refreshes_once_and_retries_with_new_token() {
    let (server, client) = setup().await;
    client.http().set_tokens(tokens("old", "r1"));

    Mock::given(method("GET"))
        .and(path("/api/locations/"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    mount_refresh(&server, "r1", 200, json!({ "access": "new" })).await;

    Mock::given(method("GET"))
        .and(path("/api/locations/"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 1, "name": "Depot" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let locations = client.list_locations(false).await.unwrap();
    assert_eq!(locations.len(), 1);
    assert!(client.http().is_authenticated());
}

#[tokio::test]
async fn test_failed_refresh_logs_out_with_redirect() {
    let (server, client) = setup().await;
    client.http().set_tokens(tokens("old", "r1"));
    let session = client.http().subscribe_session();

    Mock::given(method("GET"))
        .and(path("/api/visits/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    mount_refresh(
        &server,
        "r1",
        401,
        json!({ "detail": "Token is invalid or expired" }),
    )
    .await;

    let err = client
        .list_visits(&QueryParams::new(), false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SessionExpired));
    assert!(err.is_auth_expired());
    assert!(!client.http().is_authenticated());
    assert_eq!(
        *session.borrow(),
        SessionState::LoggedOut {
            redirect: "/home".into(),
            reason: LogoutReason::SessionExpired,
        }
    );
}

#[tokio::test]
async fn test_custom_logout_redirect_is_published() {
    let server = MockServer::start().await;
    let http = vendtrack_api::HttpClient::from_reqwest(
        &format!("{}/api", server.uri()),
        reqwest::Client::new(),
    )
    .unwrap()
    .with_logout_redirect("/login");
    http.set_tokens(tokens("old", "r1"));

    Mock::given(method("GET"))
        .and(path("/api/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_refresh(&server, "r1", 400, json!({})).await;

    let err = http.fetch_profile().await.unwrap_err();

    assert!(matches!(err, Error::SessionExpired));
    assert!(matches!(
        http.session_state(),
        SessionState::LoggedOut { ref redirect, .. } if redirect == "/login"
    ));
}

#[tokio::test]
async fn test_second_401_after_refresh_is_terminal() {
    let (server, client) = setup().await;
    client.http().set_tokens(tokens("old", "r1"));

    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    mount_refresh(&server, "r1", 200, json!({ "access": "new" })).await;

    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "User is inactive" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .list_products(&QueryParams::new(), false)
        .await
        .unwrap_err();

    match err {
        Error::Authentication { message } => assert_eq!(message, "User is inactive"),
        other => panic!("expected Authentication, got {other:?}"),
    }
}

#[tokio::test]
async fn test_401_without_refresh_token_is_not_retried() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/machines/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Authentication credentials were not provided."
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .list_machines(&QueryParams::new(), false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication { .. }));
    assert_eq!(client.http().session_state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let (server, client) = setup().await;
    client.http().set_tokens(tokens("old", "r1"));

    for p in ["/api/locations/", "/api/suppliers/"] {
        Mock::given(method("GET"))
            .and(path(p))
            .and(header("Authorization", "Bearer old"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(p))
            .and(header("Authorization", "Bearer new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
    }
    mount_refresh(&server, "r1", 200, json!({ "access": "new" })).await;

    let none = QueryParams::new();
    let (locations, suppliers) = tokio::join!(
        client.list_locations(false),
        client.list_suppliers(&none, false)
    );

    assert!(locations.unwrap().is_empty());
    assert!(suppliers.unwrap().is_empty());
}
