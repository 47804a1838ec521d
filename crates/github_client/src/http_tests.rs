use super::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> ReqwestTransport {
    let settings = ClientSettings::new(SecretString::from("ghp_test_token".to_string()));
    ReqwestTransport::new(&settings).expect("Failed to build transport")
}

#[tokio::test]
async fn test_reqwest_transport_sends_default_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer ghp_test_token"))
        .and(header("accept", GITHUB_ACCEPT))
        .and(header("x-github-api-version", GITHUB_API_VERSION))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "login": "octocat" }))
                .insert_header("X-RateLimit-Remaining", "4999"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = transport()
        .send(HttpRequest::new(
            HttpMethod::Get,
            format!("{}/user", server.uri()),
        ))
        .await
        .expect("Request should succeed");

    assert_eq!(response.status, 200);
    assert_eq!(response.header("x-ratelimit-remaining"), Some("4999"));
    assert_eq!(response.json().unwrap()["login"], "octocat");
}

#[tokio::test]
async fn test_reqwest_transport_merges_query_into_existing_url_query() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/repos/o/r/code-scanning/analyses/7"))
        .and(query_param("confirm_delete", "true"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = HttpRequest::new(
        HttpMethod::Delete,
        format!(
            "{}/repos/o/r/code-scanning/analyses/7?confirm_delete=true",
            server.uri()
        ),
    );
    request.query.push(("page".to_string(), "2".to_string()));

    let response = transport().send(request).await.unwrap();

    assert_eq!(response.status, 204);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_reqwest_transport_sends_json_body() {
    let server = MockServer::start().await;
    let payload = json!({ "state": "dismissed", "dismissed_reason": "false positive" });

    Mock::given(method("PATCH"))
        .and(path("/repos/o/r/code-scanning/alerts/3"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "number": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = HttpRequest::new(
        HttpMethod::Patch,
        format!("{}/repos/o/r/code-scanning/alerts/3", server.uri()),
    );
    request.body = Some(payload);

    let response = transport().send(request).await.unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_reqwest_transport_returns_error_statuses_as_responses() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/user/following/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let response = transport()
        .send(HttpRequest::new(
            HttpMethod::Put,
            format!("{}/user/following/ghost", server.uri()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.body, "Not Found");
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_reqwest_transport_connection_failure_is_transport_error() {
    let result = transport()
        .send(HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:1/user"))
        .await;

    assert!(result.is_err());
}

#[test]
fn test_response_header_lookup_is_case_insensitive() {
    let response = HttpResponse::new(200).with_header("Link", "<https://x?page=2>; rel=\"next\"");

    assert!(response.header("link").is_some());
    assert!(response.header("LINK").is_some());
    assert!(response.header("etag").is_none());
}

#[test]
fn test_request_query_param_lookup() {
    let mut request = HttpRequest::new(HttpMethod::Get, "https://api.github.com/user/followers");
    request.query.push(("per_page".to_string(), "100".to_string()));

    assert_eq!(request.query_param("per_page"), Some("100"));
    assert_eq!(request.query_param("page"), None);
}

#[test]
fn test_invalid_token_characters_are_rejected() {
    let settings = ClientSettings::new(SecretString::from("bad\ntoken".to_string()));

    let result = ReqwestTransport::new(&settings);

    assert!(matches!(result, Err(Error::ClientBuild(_))));
}
