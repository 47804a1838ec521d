use super::*;
use github_client::{HttpMethod, HttpResponse};
use serde_json::json;
use test_utils::{id_records, json_array, relative, TestApi};

fn org() -> PackageScope {
    PackageScope::Org("acme".to_string())
}

#[test]
fn test_parse_lenient_known_types() {
    assert_eq!(PackageType::parse_lenient("npm"), PackageType::Npm);
    assert_eq!(PackageType::parse_lenient(" Maven "), PackageType::Maven);
    assert_eq!(PackageType::parse_lenient("NUGET"), PackageType::Nuget);
}

#[test]
fn test_parse_lenient_unknown_falls_back_to_container() {
    assert_eq!(PackageType::parse_lenient("docker"), PackageType::Container);
    assert_eq!(PackageType::parse_lenient(""), PackageType::Container);
}

#[test]
fn test_package_path_encodes_name() {
    assert_eq!(
        package_path(&org(), PackageType::Container, "team/app"),
        "orgs/acme/packages/container/team%2Fapp"
    );
    assert_eq!(
        package_path(&PackageScope::User("bob".into()), PackageType::Npm, "lib"),
        "users/bob/packages/npm/lib"
    );
}

#[tokio::test]
async fn test_list_packages_filters_by_type() {
    let api = TestApi::new();
    api.respond(json_array(vec![
        json!({ "id": 1, "name": "app", "visibility": "private" }),
        json!({ "id": 2, "name": "tool", "visibility": "public" }),
    ]));

    let packages = list_packages(&api.executor, &org(), PackageType::Npm, 100)
        .await
        .unwrap();

    assert_eq!(packages.len(), 2);
    assert_eq!(packages[1].str_field("name"), Some("tool"));
    let request = &api.requests()[0];
    assert_eq!(relative(&request.url), "/orgs/acme/packages");
    assert_eq!(request.query_param("package_type"), Some("npm"));
}

#[tokio::test]
async fn test_delete_package() {
    let api = TestApi::new();
    api.respond_status(204);

    delete_package(&api.executor, &org(), PackageType::Container, "app")
        .await
        .unwrap();

    assert_eq!(
        api.paths_with(HttpMethod::Delete),
        vec!["/orgs/acme/packages/container/app"]
    );
}

#[tokio::test]
async fn test_delete_package_not_found() {
    let api = TestApi::new();
    api.respond_status(404);

    let result = delete_package(&api.executor, &org(), PackageType::Container, "gone").await;

    assert!(matches!(
        result,
        Err(Error::GitHub(github_client::Error::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_list_package_versions() {
    let api = TestApi::new();
    api.respond(json_array(vec![
        json!({ "id": 90, "name": "sha256:aaa" }),
        json!({ "id": 91, "name": "sha256:bbb" }),
    ]));

    let versions = list_package_versions(&api.executor, &org(), PackageType::Container, "app", 100)
        .await
        .unwrap();

    assert_eq!(versions.len(), 2);
    assert_eq!(
        relative(&api.requests()[0].url),
        "/orgs/acme/packages/container/app/versions"
    );
}

#[tokio::test]
async fn test_delete_package_versions_skips_invalid_ids() {
    let api = TestApi::new();
    api.respond_status(204).respond_status(204);
    let ids = vec!["10".to_string(), "abc".to_string(), " 12 ".to_string()];

    let summary = delete_package_versions(&api.executor, &org(), PackageType::Container, "app", &ids)
        .await
        .unwrap();

    assert_eq!(summary.deleted, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        api.paths_with(HttpMethod::Delete),
        vec![
            "/orgs/acme/packages/container/app/versions/10",
            "/orgs/acme/packages/container/app/versions/12"
        ]
    );
}

#[tokio::test]
async fn test_delete_package_versions_aborts_on_failure() {
    let api = TestApi::new();
    api.respond_status(204);
    api.respond(HttpResponse::new(400).with_body("last version cannot be deleted"));
    let ids: Vec<String> = ["1", "2", "3"].iter().map(|s| s.to_string()).collect();

    let result = delete_package_versions(&api.executor, &org(), PackageType::Npm, "lib", &ids).await;

    assert!(result.is_err());
    assert_eq!(api.requests_with(HttpMethod::Delete).len(), 2);
}

#[tokio::test]
async fn test_delete_package_versions_empty_list_makes_no_calls() {
    let api = TestApi::new();

    let summary = delete_package_versions(&api.executor, &org(), PackageType::Npm, "lib", &[])
        .await
        .unwrap();

    assert_eq!(summary, DeleteSummary::default());
    assert_eq!(api.request_count(), 0);
}

#[tokio::test]
async fn test_delete_all_package_versions() {
    let api = TestApi::new();
    api.respond(json_array(id_records([7, 8, 9])));
    for _ in 0..3 {
        api.respond_status(204);
    }

    let summary = delete_all_package_versions(&api.executor, &org(), PackageType::Maven, "core", 100)
        .await
        .unwrap();

    assert_eq!(summary.deleted, 3);
    assert_eq!(
        api.paths_with(HttpMethod::Delete)[2],
        "/orgs/acme/packages/maven/core/versions/9"
    );
}
