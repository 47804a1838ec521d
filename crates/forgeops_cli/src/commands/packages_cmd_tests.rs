use super::*;
use crate::config::SocialSettings;
use forgeops_core::Prompter;
use github_client::HttpMethod;
use serde_json::json;
use std::cell::RefCell;
use test_utils::{id_records, json_array, TestApi};

struct ScriptedPrompter {
    answers: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    fn new(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().rev().map(|a| a.to_string()).collect()),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, _label: &str) -> Result<String, forgeops_core::Error> {
        Ok(self.answers.borrow_mut().pop().unwrap_or_default())
    }
}

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

fn org_scope(package_type: &str) -> PackageScopeArgs {
    PackageScopeArgs {
        org: Some("acme".to_string()),
        user: None,
        package_type: package_type.to_string(),
    }
}

#[tokio::test]
async fn test_list_returns_rows() {
    let api = TestApi::new();
    api.respond(json_array(vec![
        json!({ "id": 1, "name": "web", "visibility": "public" }),
        json!({ "id": 2, "name": "worker" }),
    ]));
    let social = social();
    let ctx = CommandContext {
        env: &no_env,
        prompter: None,
        page_size: 100,
        social: &social,
    };

    let outcome = run(
        &api.executor,
        &PackagesCommands::List {
            scope: org_scope("npm"),
        },
        &ctx,
    )
    .await
    .unwrap();

    let PackagesOutcome::Listed { packages } = outcome else {
        panic!("expected a listing");
    };
    assert_eq!(packages.len(), 2);
    assert_eq!(packages[0].visibility.as_deref(), Some("public"));
    assert_eq!(packages[1].visibility, None);
    let listing = &api.requests()[0];
    assert_eq!(test_utils::relative(&listing.url), "/orgs/acme/packages");
    assert_eq!(listing.query_param("package_type"), Some("npm"));
}

#[tokio::test]
async fn test_unknown_type_falls_back_to_container() {
    let api = TestApi::new();
    api.respond_status(204);
    let social = social();
    let ctx = CommandContext {
        env: &no_env,
        prompter: None,
        page_size: 100,
        social: &social,
    };

    let outcome = run(
        &api.executor,
        &PackagesCommands::Delete {
            scope: org_scope("docker"),
            package: Some("web".to_string()),
        },
        &ctx,
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        PackagesOutcome::PackageDeleted {
            deleted: "web".to_string()
        }
    );
    assert_eq!(
        api.paths_with(HttpMethod::Delete),
        vec!["/orgs/acme/packages/container/web"]
    );
}

#[tokio::test]
async fn test_package_name_is_prompted() {
    let api = TestApi::new();
    api.respond_status(204);
    let prompter = ScriptedPrompter::new(&["", "alice", "tool"]);
    let social = social();
    let ctx = CommandContext {
        env: &no_env,
        prompter: Some(&prompter),
        page_size: 100,
        social: &social,
    };

    run(
        &api.executor,
        &PackagesCommands::Delete {
            scope: PackageScopeArgs {
                package_type: "container".to_string(),
                ..Default::default()
            },
            package: None,
        },
        &ctx,
    )
    .await
    .unwrap();

    assert_eq!(
        api.paths_with(HttpMethod::Delete),
        vec!["/users/alice/packages/container/tool"]
    );
}

#[tokio::test]
async fn test_missing_package_name_is_usage_error() {
    let api = TestApi::new();
    let social = social();
    let ctx = CommandContext {
        env: &no_env,
        prompter: None,
        page_size: 100,
        social: &social,
    };

    let err = run(
        &api.executor,
        &PackagesCommands::Delete {
            scope: org_scope("container"),
            package: Some("  ".to_string()),
        },
        &ctx,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), "MissingInput");
    assert_eq!(api.request_count(), 0);
}

#[tokio::test]
async fn test_delete_listed_versions() {
    let api = TestApi::new();
    api.respond_status(204).respond_status(204);
    let social = social();
    let ctx = CommandContext {
        env: &no_env,
        prompter: None,
        page_size: 100,
        social: &social,
    };

    let outcome = run(
        &api.executor,
        &PackagesCommands::DeleteVersions {
            scope: org_scope("container"),
            package: Some("web".to_string()),
            versions: vec!["10".to_string(), "abc".to_string(), "11".to_string()],
            all_versions: false,
        },
        &ctx,
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        PackagesOutcome::VersionsDeleted(DeleteSummary {
            scanned: 3,
            deleted: 2,
            skipped: 1,
        })
    );
    assert_eq!(
        api.paths_with(HttpMethod::Delete),
        vec![
            "/orgs/acme/packages/container/web/versions/10",
            "/orgs/acme/packages/container/web/versions/11"
        ]
    );
}

#[tokio::test]
async fn test_delete_all_versions() {
    let api = TestApi::new();
    api.respond(json_array(id_records([5, 6])));
    api.respond_status(204).respond_status(204);
    let social = social();
    let ctx = CommandContext {
        env: &no_env,
        prompter: None,
        page_size: 100,
        social: &social,
    };

    let outcome = run(
        &api.executor,
        &PackagesCommands::DeleteVersions {
            scope: org_scope("container"),
            package: Some("web".to_string()),
            versions: Vec::new(),
            all_versions: true,
        },
        &ctx,
    )
    .await
    .unwrap();

    let PackagesOutcome::VersionsDeleted(summary) = outcome else {
        panic!("expected a version summary");
    };
    assert_eq!(summary.deleted, 2);
    assert_eq!(api.requests_with(HttpMethod::Get).len(), 1);
}

#[test]
fn test_outcome_json_shapes() {
    let listed = PackagesOutcome::Listed {
        packages: vec![PackageRow {
            id: Some(1),
            name: Some("web".to_string()),
            visibility: None,
        }],
    };
    assert_eq!(
        serde_json::to_value(&listed).unwrap(),
        json!({ "packages": [{ "id": 1, "name": "web", "visibility": null }] })
    );

    let deleted = PackagesOutcome::PackageDeleted {
        deleted: "web".to_string(),
    };
    assert_eq!(serde_json::to_value(&deleted).unwrap(), json!({ "deleted": "web" }));
}
