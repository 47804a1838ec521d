use super::*;
use test_utils::{alert, analysis, json_array, json_object, relative, TestApi, TEST_API_URL};

fn target() -> RepoTarget {
    RepoTarget::new("octo", "widgets").unwrap()
}

fn analysis_url(id: u64) -> String {
    format!("{TEST_API_URL}/repos/octo/widgets/code-scanning/analyses/{id}")
}

#[tokio::test]
async fn test_delete_analysis_follows_confirm_chain() {
    let api = TestApi::new();
    let a = format!("{}?confirm_delete", analysis_url(40));
    let b = format!("{}?confirm_delete", analysis_url(39));
    api.respond(json_object(200, json!({ "confirm_delete_url": a, "next_analysis_url": null })));
    api.respond(json_object(200, json!({ "confirm_delete_url": b, "next_analysis_url": null })));
    api.respond_status(204);
    let client = CodeScanningClient::new(&api.executor, target());

    let deletion = client.delete_analysis(41).await.unwrap();

    assert_eq!(deletion.requests, 3);
    let urls: Vec<String> = api.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(urls, vec![analysis_url(41), a, b]);
}

#[tokio::test]
async fn test_delete_analysis_done_when_no_follow_up_urls() {
    let api = TestApi::new();
    api.respond(json_object(
        200,
        json!({ "confirm_delete_url": null, "next_analysis_url": null }),
    ));
    let client = CodeScanningClient::new(&api.executor, target());

    let deletion = client.delete_analysis(7).await.unwrap();

    assert_eq!(deletion.requests, 1);
    assert_eq!(api.request_count(), 1);
}

#[tokio::test]
async fn test_delete_analysis_no_content_is_done() {
    let api = TestApi::new();
    api.respond_status(204);
    let client = CodeScanningClient::new(&api.executor, target());

    let deletion = client.delete_analysis(7).await.unwrap();

    assert_eq!(deletion.requests, 1);
}

#[tokio::test]
async fn test_delete_analysis_retries_with_confirmation_after_400() {
    let api = TestApi::new();
    api.respond(
        HttpResponse::new(400)
            .with_body("{\"message\":\"Analysis is last of its type and deletion may cause alert loss; use confirm_delete\"}"),
    );
    api.respond_status(204);
    let client = CodeScanningClient::new(&api.executor, target());

    let deletion = client.delete_analysis(12).await.unwrap();

    assert_eq!(deletion.requests, 2);
    assert_eq!(
        api.requests()[1].url,
        format!("{}?confirm_delete=true", analysis_url(12))
    );
}

#[tokio::test]
async fn test_confirmation_hint_is_case_insensitive() {
    let api = TestApi::new();
    api.respond(HttpResponse::new(400).with_body("Set CONFIRM_DELETE to remove the last analysis"));
    api.respond_status(204);
    let client = CodeScanningClient::new(&api.executor, target());

    let deletion = client.delete_analysis(13).await.unwrap();

    assert_eq!(deletion.requests, 2);
    assert_eq!(api.requests()[1].query_param("confirm_delete"), Some("true"));
}

#[tokio::test]
async fn test_delete_analysis_confirmation_falls_through_to_chain() {
    let api = TestApi::new();
    api.respond(HttpResponse::new(400).with_body("requires confirm_delete"));
    api.respond(json_object(
        202,
        json!({ "confirm_delete_url": null, "next_analysis_url": analysis_url(11) }),
    ));
    api.respond_status(204);
    let client = CodeScanningClient::new(&api.executor, target());

    let deletion = client.delete_analysis(12).await.unwrap();

    assert_eq!(deletion.requests, 3);
    // The continuation URL gets the confirmation flag added.
    assert_eq!(
        api.requests()[2].url,
        format!("{}?confirm_delete=true", analysis_url(11))
    );
}

#[tokio::test]
async fn test_delete_analysis_fails_on_other_status() {
    let api = TestApi::new();
    api.respond(HttpResponse::new(422).with_body("Unprocessable"));
    let client = CodeScanningClient::new(&api.executor, target());

    let result = client.delete_analysis(3).await;

    match result {
        Err(Error::GitHub(github_client::Error::UnexpectedStatus { status, body, .. })) => {
            assert_eq!(status, 422);
            assert_eq!(body, "Unprocessable");
        }
        other => panic!("Expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_analysis_400_without_confirmation_hint_fails() {
    let api = TestApi::new();
    api.respond(HttpResponse::new(400).with_body("Bad Request"));
    let client = CodeScanningClient::new(&api.executor, target());

    let result = client.delete_analysis(3).await;

    assert!(result.is_err());
    assert_eq!(api.request_count(), 1);
}

#[tokio::test]
async fn test_delete_analyses_rescans_after_each_deletion() {
    let api = TestApi::new();
    api.respond(json_array(vec![
        analysis(1, "Trivy", true),
        analysis(2, "CodeQL", true),
    ]));
    api.respond_status(204);
    api.respond(json_array(vec![
        analysis(3, "trivy", true),
        analysis(2, "CodeQL", true),
    ]));
    api.respond_status(204);
    api.respond(json_array(vec![
        analysis(4, "Trivy", false),
        analysis(2, "CodeQL", true),
    ]));
    let client = CodeScanningClient::new(&api.executor, target());

    let sweep = client
        .delete_analyses(&ToolFilter::parse_csv("Trivy"), false)
        .await
        .unwrap();

    assert_eq!(sweep.deleted, 2);
    // Each scan stops at the first candidate.
    assert_eq!(sweep.scanned, 4);
    assert_eq!(sweep.would_delete, None);
    let deletes: Vec<String> = api
        .requests_with(HttpMethod::Delete)
        .into_iter()
        .map(|r| relative(&r.url))
        .collect();
    assert_eq!(
        deletes,
        vec![
            "/repos/octo/widgets/code-scanning/analyses/1",
            "/repos/octo/widgets/code-scanning/analyses/3"
        ]
    );
}

#[tokio::test]
async fn test_delete_analyses_never_retries_same_id() {
    let api = TestApi::new();
    api.respond(json_array(vec![analysis(5, "Grype", true)]));
    api.respond_status(204);
    // GitHub still lists the analysis; it must not be deleted twice.
    api.respond(json_array(vec![analysis(5, "Grype", true)]));
    let client = CodeScanningClient::new(&api.executor, target());

    let sweep = client
        .delete_analyses(&ToolFilter::default(), false)
        .await
        .unwrap();

    assert_eq!(sweep.deleted, 1);
    assert_eq!(api.requests_with(HttpMethod::Delete).len(), 1);
}

#[tokio::test]
async fn test_delete_analyses_aborts_on_failure() {
    let api = TestApi::new();
    api.respond(json_array(vec![analysis(1, "Trivy", true)]));
    api.respond(HttpResponse::new(422).with_body("nope"));
    let client = CodeScanningClient::new(&api.executor, target());

    let result = client
        .delete_analyses(&ToolFilter::parse_csv("Trivy"), false)
        .await;

    assert!(result.is_err());
    assert_eq!(api.request_count(), 2);
}

#[tokio::test]
async fn test_delete_analyses_dry_run_scans_once() {
    let api = TestApi::new();
    api.respond(json_array(vec![
        analysis(1, "Trivy", true),
        analysis(2, "Grype", true),
        analysis(3, "Grype", false),
        analysis(4, "CodeQL", true),
    ]));
    let client = CodeScanningClient::new(&api.executor, target());

    let sweep = client
        .delete_analyses(&ToolFilter::parse_csv("Trivy,Grype"), true)
        .await
        .unwrap();

    assert_eq!(sweep.deleted, 0);
    assert_eq!(sweep.scanned, 4);
    assert_eq!(sweep.would_delete, Some(2));
    assert_eq!(api.request_count(), 1);
}

#[tokio::test]
async fn test_dismiss_alerts_is_best_effort() {
    let api = TestApi::new();
    api.respond(json_array(vec![
        alert(1, "Trivy", "CVE-2024-0001"),
        alert(2, "CodeQL", "js/xss"),
        alert(3, "Grype", "CVE-2024-0003"),
        json!({ "tool": { "name": "Trivy" } }),
    ]));
    api.respond(json_object(200, json!({ "number": 1 })));
    api.respond(HttpResponse::new(422).with_body("cannot dismiss"));
    let client = CodeScanningClient::new(&api.executor, target());

    let summary = client
        .dismiss_alerts(
            &ToolFilter::parse_csv("Trivy, Grype"),
            AlertState::Open,
            DismissReason::FalsePositive,
            "Bulk reset",
            false,
        )
        .await
        .unwrap();

    assert_eq!(
        summary,
        DismissSummary {
            scanned: 4,
            dismissed: 1,
            failed: 1,
            skipped: 1,
            would_dismiss: None
        }
    );
    assert_eq!(api.requests()[0].query_param("state"), Some("open"));
    let patches = api.requests_with(HttpMethod::Patch);
    assert_eq!(patches.len(), 2);
    assert_eq!(
        relative(&patches[0].url),
        "/repos/octo/widgets/code-scanning/alerts/1"
    );
    assert_eq!(
        patches[0].body,
        Some(json!({
            "state": "dismissed",
            "dismissed": true,
            "dismissed_reason": "false positive",
            "dismissed_comment": "Bulk reset"
        }))
    );
}

#[tokio::test]
async fn test_dismiss_alerts_dry_run_makes_no_patches() {
    let api = TestApi::new();
    api.respond(json_array(vec![alert(1, "Trivy", "CVE-1"), alert(2, "Trivy", "CVE-2")]));
    let client = CodeScanningClient::new(&api.executor, target());

    let summary = client
        .dismiss_alerts(
            &ToolFilter::default(),
            AlertState::Open,
            DismissReason::WontFix,
            "",
            true,
        )
        .await
        .unwrap();

    assert_eq!(summary.would_dismiss, Some(2));
    assert_eq!(summary.dismissed, 0);
    assert!(api.requests_with(HttpMethod::Patch).is_empty());
}

#[tokio::test]
async fn test_dismiss_alert_truncates_long_comment() {
    let api = TestApi::new();
    api.respond(json_object(200, json!({})));
    let client = CodeScanningClient::new(&api.executor, target());

    client
        .dismiss_alert(9, DismissReason::UsedInTests, &"x".repeat(400))
        .await
        .unwrap();

    let body = api.requests()[0].body.clone().unwrap();
    assert_eq!(body["dismissed_comment"].as_str().unwrap().len(), 280);
    assert_eq!(body["dismissed_reason"], "used in tests");
}

#[test]
fn test_tool_filter() {
    let filter = ToolFilter::parse_csv(" Trivy , ,Grype");

    assert_eq!(filter.tools(), ["Trivy".to_string(), "Grype".to_string()]);
    assert!(filter.matches(Some("trivy")));
    assert!(filter.matches(Some("Grype")));
    assert!(!filter.matches(Some("CodeQL")));
    assert!(!filter.matches(None));

    let all = ToolFilter::parse_csv("");
    assert!(all.is_empty());
    assert!(all.matches(Some("CodeQL")));
    assert!(all.matches(None));
}

#[test]
fn test_with_confirm_flag() {
    assert_eq!(
        with_confirm_flag("https://api.github.com/repos/o/r/code-scanning/analyses/1"),
        "https://api.github.com/repos/o/r/code-scanning/analyses/1?confirm_delete=true"
    );
    assert_eq!(
        with_confirm_flag("https://api.github.com/x/analyses/1?page=2"),
        "https://api.github.com/x/analyses/1?page=2&confirm_delete=true"
    );
    assert_eq!(
        with_confirm_flag("https://api.github.com/x/analyses/1?confirm_delete"),
        "https://api.github.com/x/analyses/1?confirm_delete"
    );
    assert_eq!(with_confirm_flag("analyses/1"), "analyses/1?confirm_delete=true");
}

#[test]
fn test_dismiss_reason_parsing() {
    assert_eq!(
        DismissReason::parse("false_positive").unwrap(),
        DismissReason::FalsePositive
    );
    assert_eq!(DismissReason::parse("won't_fix").unwrap(), DismissReason::WontFix);
    assert_eq!(DismissReason::parse("Used In Tests").unwrap(), DismissReason::UsedInTests);
    assert!(matches!(
        DismissReason::parse("invalid"),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_alert_state_parsing() {
    assert_eq!(AlertState::parse("OPEN").unwrap(), AlertState::Open);
    assert_eq!(AlertState::parse("fixed").unwrap().as_str(), "fixed");
    assert!(AlertState::parse("closed").is_err());
}
