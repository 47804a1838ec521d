use super::*;
use crate::testing::{ManualClock, MockTransport};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const NOW: f64 = 1_700_000_000.0;

fn setup() -> (Arc<MockTransport>, Arc<ManualClock>, RequestExecutor) {
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(ManualClock::new(NOW));
    let executor = RequestExecutor::new(transport.clone(), clock.clone());
    (transport, clock, executor)
}

fn rate_limit(remaining: i64, reset: i64) -> HttpResponse {
    HttpResponse::new(200).with_json(&json!({
        "resources": { "core": { "limit": 5000, "remaining": remaining, "reset": reset } }
    }))
}

#[tokio::test]
async fn test_token_with_required_scopes_passes() {
    let (transport, clock, executor) = setup();
    transport.push_response(
        HttpResponse::new(200)
            .with_header("X-OAuth-Scopes", "repo, workflow, read:org")
            .with_json(&json!({ "login": "octocat" })),
    );
    transport.push_response(rate_limit(4000, NOW as i64 + 60));

    let status = ensure_token_ready(&executor, &["repo", "workflow"])
        .await
        .unwrap();

    assert!(status.granted_scopes.contains("workflow"));
    assert_eq!(status.core_remaining, Some(4000));
    assert!(clock.sleeps().is_empty());
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_missing_scope_is_reported() {
    let (transport, _clock, executor) = setup();
    transport.push_response(HttpResponse::new(200).with_header("X-OAuth-Scopes", "repo"));

    let result = ensure_token_ready(&executor, &["repo", "workflow"]).await;

    match result {
        Err(Error::MissingScopes { missing }) => assert_eq!(missing, vec!["workflow".to_string()]),
        other => panic!("Expected MissingScopes, got {other:?}"),
    }
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_unreported_scopes_only_warn() {
    let (transport, _clock, executor) = setup();
    transport.push_response(HttpResponse::new(200).with_json(&json!({ "login": "bot" })));
    transport.push_response(rate_limit(10, NOW as i64 + 60));

    let status = ensure_token_ready(&executor, &["delete:packages"])
        .await
        .unwrap();

    assert!(status.granted_scopes.is_empty());
}

#[tokio::test]
async fn test_exhausted_core_quota_waits_for_reset() {
    let (transport, clock, executor) = setup();
    transport.push_response(HttpResponse::new(200).with_header("X-OAuth-Scopes", "repo"));
    transport.push_response(rate_limit(0, NOW as i64 + 20));

    ensure_token_ready(&executor, &["repo"]).await.unwrap();

    assert_eq!(clock.sleeps(), vec![Duration::from_secs(21)]);
}

#[tokio::test]
async fn test_rejected_token_is_auth_error() {
    let (transport, _clock, executor) = setup();
    transport.push_response(HttpResponse::new(401).with_body("Bad credentials"));

    let result = ensure_token_ready(&executor, &["repo"]).await;

    assert!(matches!(result, Err(Error::Auth { status: 401, .. })));
}

#[test]
fn test_scope_satisfied_by_parent_scope() {
    let granted: BTreeSet<String> = ["repo".to_string(), "delete:packages".to_string()].into();

    assert!(scope_satisfied("repo", &granted));
    assert!(scope_satisfied("security_events", &granted));
    assert!(scope_satisfied("read:packages", &granted));
    assert!(!scope_satisfied("workflow", &granted));
}

#[test]
fn test_granted_scopes_parsing() {
    let response = HttpResponse::new(200).with_header("x-oauth-scopes", " repo ,  , gist");

    let scopes = granted_scopes(&response);

    assert_eq!(scopes.len(), 2);
    assert!(scopes.contains("repo"));
    assert!(scopes.contains("gist"));
}
