//! Reauthentication policy tests: one bounded login-and-retry cycle.

mod common;

use std::path::PathBuf;

use common::mock_api::{CapturedRequest, MockApi, MockResponse};
use common::{login_response, orders_response, test_config, trolley_response};
use tempfile::TempDir;
use trolley::api::credentials::{CredentialSource, Credentials, SecureString};
use trolley::api::{ApiClient, ApiError};
use trolley::config::{SessionRecord, SessionStore};

/// Always hands out the same fixed credentials.
struct StaticCredentials;

impl CredentialSource for StaticCredentials {
    fn resolve(&self) -> Option<Credentials> {
        Some(Credentials {
            username: "user@example.com".to_string(),
            password: SecureString::new("hunter2".to_string()),
        })
    }
}

/// Never has credentials.
struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn resolve(&self) -> Option<Credentials> {
        None
    }
}

fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("session.toml")
}

fn client(
    mock: &MockApi,
    dir: &TempDir,
    credentials: Box<dyn CredentialSource>,
) -> ApiClient {
    let config = test_config(&mock.base_url());
    ApiClient::new(&config, SessionStore::new(store_path(dir)), credentials)
}

/// Seed the store with an already-authenticated session.
fn seed_session(dir: &TempDir, token: &str) {
    let store = SessionStore::new(store_path(dir));
    store
        .save(&SessionRecord {
            access_token: Some(token.to_string()),
            refresh_token: Some("refresh-1".to_string()),
            customer_id: Some("C1".to_string()),
            customer_order_id: Some("O1".to_string()),
            customer_order_state: Some("PENDING".to_string()),
            default_branch_id: Some("B1".to_string()),
            username: Some("user@example.com".to_string()),
            expires_at: Some(1),
        })
        .unwrap();
}

fn login_count(requests: &[CapturedRequest]) -> usize {
    requests
        .iter()
        .filter(|r| r.body_text().contains("generateSession"))
        .count()
}

#[tokio::test]
async fn first_call_logs_in_persists_and_runs() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    mock.enqueue_response(MockResponse::json(&login_response("tok-1")))
        .await;
    mock.enqueue_response(MockResponse::json(&trolley_response("Bananas")))
        .await;

    let mut client = client(&mock, &dir, Box::new(StaticCredentials));
    assert!(!client.is_authenticated());

    let trolley = client.trolley().await.unwrap();
    assert_eq!(
        trolley.trolley_items[0].product_name.as_deref(),
        Some("Bananas")
    );
    assert!(client.is_authenticated());

    let requests = mock.captured_requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(login_count(&requests), 1);
    // The trolley call went out with the fresh token.
    assert_eq!(requests[1].header("authorization"), Some("Bearer tok-1"));

    // The session survived for the next invocation.
    let record = SessionStore::new(store_path(&dir)).load().unwrap().unwrap();
    assert_eq!(record.access_token.as_deref(), Some("tok-1"));
    assert_eq!(record.customer_order_id.as_deref(), Some("O1"));
}

#[tokio::test]
async fn persisted_session_is_reused_without_login() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    seed_session(&dir, "persisted-tok");
    mock.enqueue_response(MockResponse::json(&trolley_response("Bananas")))
        .await;

    let mut client = client(&mock, &dir, Box::new(NoCredentials));
    assert!(client.is_authenticated());

    client.trolley().await.unwrap();

    let requests = mock.captured_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(login_count(&requests), 0);
    assert_eq!(
        requests[0].header("authorization"),
        Some("Bearer persisted-tok")
    );
}

#[tokio::test]
async fn expired_token_triggers_exactly_one_relogin_then_succeeds() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    // Whole chain starting unauthenticated: initial login, 401 on the
    // operation, one re-login, then success. Login runs exactly twice.
    mock.enqueue_response(MockResponse::json(&login_response("tok-1")))
        .await;
    mock.enqueue_response(MockResponse::error(401, "Unauthorized"))
        .await;
    mock.enqueue_response(MockResponse::json(&login_response("tok-2")))
        .await;
    mock.enqueue_response(MockResponse::json(&trolley_response("Bananas")))
        .await;

    let mut client = client(&mock, &dir, Box::new(StaticCredentials));
    let trolley = client.trolley().await.unwrap();
    assert_eq!(trolley.trolley_items.len(), 1);

    let requests = mock.captured_requests().await;
    assert_eq!(requests.len(), 4);
    assert_eq!(login_count(&requests), 2);
    // The retry used the replacement session's token.
    assert_eq!(requests[3].header("authorization"), Some("Bearer tok-2"));
}

#[tokio::test]
async fn persistent_401_stops_after_one_retry() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    seed_session(&dir, "stale-tok");
    mock.enqueue_response(MockResponse::error(401, "Unauthorized"))
        .await;
    mock.enqueue_response(MockResponse::json(&login_response("tok-2")))
        .await;
    mock.enqueue_response(MockResponse::error(401, "Unauthorized"))
        .await;

    let mut client = client(&mock, &dir, Box::new(StaticCredentials));
    let err = client.trolley().await.unwrap_err();
    match err {
        ApiError::ReauthenticationFailed { source } => {
            assert!(matches!(*source, ApiError::Transport { status: 401, .. }));
        }
        other => panic!("expected ReauthenticationFailed, got {other:?}"),
    }

    // Original attempt, one re-login, one retry. Never a third attempt.
    let requests = mock.captured_requests().await;
    assert_eq!(requests.len(), 3);
    assert_eq!(login_count(&requests), 1);
}

#[tokio::test]
async fn unauthenticated_protocol_error_also_triggers_reauth() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    seed_session(&dir, "stale-tok");
    mock.enqueue_response(MockResponse::json(
        r#"{"errors": [{"message": "no token", "extensions": {"code": "UNAUTHENTICATED"}}]}"#,
    ))
    .await;
    mock.enqueue_response(MockResponse::json(&login_response("tok-2")))
        .await;
    mock.enqueue_response(MockResponse::json(&trolley_response("Bananas")))
        .await;

    let mut client = client(&mock, &dir, Box::new(StaticCredentials));
    client.trolley().await.unwrap();

    let requests = mock.captured_requests().await;
    assert_eq!(requests.len(), 3);
    assert_eq!(login_count(&requests), 1);
}

#[tokio::test]
async fn non_auth_errors_surface_with_zero_retries() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    seed_session(&dir, "tok");
    mock.enqueue_response(MockResponse::error(500, "boom")).await;

    let mut client = client(&mock, &dir, Box::new(StaticCredentials));
    let err = client.trolley().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { status: 500, .. }));

    assert_eq!(mock.captured_requests().await.len(), 1);
}

#[tokio::test]
async fn domain_failures_surface_with_zero_retries() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    seed_session(&dir, "tok");
    mock.enqueue_response(MockResponse::json(
        r#"{
            "data": {
                "getTrolley": {
                    "trolleyItems": [],
                    "failures": [{"type": "TROLLEY_LOCKED", "message": "order being picked"}]
                }
            }
        }"#,
    ))
    .await;

    let mut client = client(&mock, &dir, Box::new(StaticCredentials));
    let err = client.trolley().await.unwrap_err();
    match err {
        ApiError::Domain { failures } => {
            assert_eq!(failures[0].message, "order being picked");
        }
        other => panic!("expected Domain, got {other:?}"),
    }

    assert_eq!(mock.captured_requests().await.len(), 1);
}

#[tokio::test]
async fn missing_credentials_fail_before_any_request() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();

    let mut client = client(&mock, &dir, Box::new(NoCredentials));
    let err = client.trolley().await.unwrap_err();
    assert!(matches!(err, ApiError::NotAuthenticated));

    assert!(mock.captured_requests().await.is_empty());
}

#[tokio::test]
async fn missing_credentials_during_reauth_are_terminal() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    seed_session(&dir, "stale-tok");
    mock.enqueue_response(MockResponse::error(401, "Unauthorized"))
        .await;

    let mut client = client(&mock, &dir, Box::new(NoCredentials));
    let err = client.trolley().await.unwrap_err();
    match err {
        ApiError::ReauthenticationFailed { source } => {
            assert!(matches!(*source, ApiError::NotAuthenticated));
        }
        other => panic!("expected ReauthenticationFailed, got {other:?}"),
    }

    assert_eq!(mock.captured_requests().await.len(), 1);
}

#[tokio::test]
async fn pending_and_previous_orders_are_fetched_concurrently_and_joined() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    seed_session(&dir, "tok");
    mock.enqueue_response(MockResponse::json(&orders_response("A")))
        .await;
    mock.enqueue_response(MockResponse::json(&orders_response("B")))
        .await;

    let mut client = client(&mock, &dir, Box::new(StaticCredentials));
    let overview = client.orders().await.unwrap();

    // Both halves are well-formed regardless of which request landed first.
    assert_eq!(overview.pending.len(), 1);
    assert_eq!(overview.previous.len(), 1);
    let mut ids = vec![
        overview.pending[0].customer_order_id.clone(),
        overview.previous[0].customer_order_id.clone(),
    ];
    ids.sort();
    assert_eq!(ids, vec!["A".to_string(), "B".to_string()]);

    assert_eq!(mock.captured_requests().await.len(), 2);
}

#[tokio::test]
async fn search_runs_anonymously_without_a_session() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    mock.enqueue_response(MockResponse::json(
        r#"{"totalMatches": 1, "componentsAndProducts": [{"searchProduct": {"id": "1"}}]}"#,
    ))
    .await;

    let mut client = client(&mock, &dir, Box::new(NoCredentials));
    let results = client.search("bananas").await.unwrap();
    assert_eq!(results.total_matches, 1);

    let requests = mock.captured_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/search/-1");
    assert_eq!(requests[0].header("authorization"), None);
    // The search term travels in the request body.
    assert!(requests[0].body_text().contains("bananas"));
}

#[tokio::test]
async fn product_lookup_without_credentials_fails_before_any_request() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();

    // Unlike search, product lookup has no anonymous path.
    let mut client = client(&mock, &dir, Box::new(NoCredentials));
    let err = client.products(&["123456".to_string()]).await.unwrap_err();
    assert!(matches!(err, ApiError::NotAuthenticated));

    assert!(mock.captured_requests().await.is_empty());
}

#[tokio::test]
async fn product_lookup_logs_in_first_when_unauthenticated() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    mock.enqueue_response(MockResponse::json(&login_response("tok-1")))
        .await;
    mock.enqueue_response(MockResponse::json(
        r#"{"products": [{"id": "p1", "lineNumber": "123456", "name": "Oat Milk"}]}"#,
    ))
    .await;

    let mut client = client(&mock, &dir, Box::new(StaticCredentials));
    let products = client.products(&["123456".to_string()]).await.unwrap();
    assert_eq!(products[0].name.as_deref(), Some("Oat Milk"));

    let requests = mock.captured_requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(login_count(&requests), 1);
    // The lookup itself went out authenticated.
    assert_eq!(requests[1].method, "GET");
    assert_eq!(requests[1].path, "/products/123456");
    assert_eq!(requests[1].header("authorization"), Some("Bearer tok-1"));
}

#[tokio::test]
async fn logout_clears_local_and_persisted_state() {
    let mock = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    seed_session(&dir, "tok");
    mock.enqueue_response(MockResponse::json(r#"{"data": {"endSession": {}}}"#))
        .await;

    let mut client = client(&mock, &dir, Box::new(StaticCredentials));
    assert!(client.is_authenticated());

    client.logout().await;
    assert!(!client.is_authenticated());
    assert!(SessionStore::new(store_path(&dir)).load().unwrap().is_none());
}
