use super::*;
use crate::config::SocialSettings;
use github_client::HttpMethod;
use test_utils::{id_records, json_array, wrapped_page, TestApi};

fn no_env(_: &str) -> Option<String> {
    None
}

fn social() -> SocialSettings {
    SocialSettings {
        dry_run: true,
        allowlist: Vec::new(),
        blocklist: Vec::new(),
    }
}

fn repo_args(owner: Option<&str>, repo: Option<&str>) -> RepoArgs {
    RepoArgs {
        owner: owner.map(str::to_string),
        repo: repo.map(str::to_string),
    }
}

#[tokio::test]
async fn test_workflow_runs_use_explicit_target() {
    let api = TestApi::new();
    api.respond(wrapped_page("workflow_runs", id_records([7])));
    api.respond_status(204);
    let social = social();
    let ctx = CommandContext {
        env: &no_env,
        prompter: None,
        page_size: 50,
        social: &social,
    };

    let summary = run(
        &api.executor,
        RepoCleanup::WorkflowRuns,
        &repo_args(Some("octo"), Some("widgets")),
        &ctx,
    )
    .await
    .unwrap();

    assert_eq!(summary.deleted, 1);
    assert_eq!(api.requests()[0].query_param("per_page"), Some("50"));
    assert_eq!(
        api.paths_with(HttpMethod::Delete),
        vec!["/repos/octo/widgets/actions/runs/7"]
    );
}

#[tokio::test]
async fn test_releases_resolve_target_from_environment() {
    let api = TestApi::new();
    api.respond(json_array(Vec::new()));
    let env = |key: &str| match key {
        "GH_OWNER" => Some("env-owner".to_string()),
        "GH_REPO" => Some("env-repo".to_string()),
        _ => None,
    };
    let social = social();
    let ctx = CommandContext {
        env: &env,
        prompter: None,
        page_size: 100,
        social: &social,
    };

    let summary = run(&api.executor, RepoCleanup::Releases, &repo_args(None, None), &ctx)
        .await
        .unwrap();

    assert_eq!(summary.scanned, 0);
    assert_eq!(
        test_utils::relative(&api.requests()[0].url),
        "/repos/env-owner/env-repo/releases"
    );
}

#[tokio::test]
async fn test_missing_target_fails_without_requests() {
    let api = TestApi::new();
    let social = social();
    let ctx = CommandContext {
        env: &no_env,
        prompter: None,
        page_size: 100,
        social: &social,
    };

    let err = run(&api.executor, RepoCleanup::Caches, &repo_args(None, None), &ctx)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "MissingInput");
    assert_eq!(err.exit_code(), crate::errors::EXIT_USAGE);
    assert_eq!(api.request_count(), 0);
}
