use super::*;
use crate::cli::Cli;
use clap::Parser;

#[test]
fn test_validate_rejects_bad_dismiss_reason() {
    let cli = Cli::try_parse_from([
        "forgeops",
        "code-scanning",
        "--mode",
        "dismiss",
        "--reason",
        "meh",
    ])
    .unwrap();

    let err = validate(&cli.command).unwrap_err();

    assert_eq!(err.kind(), "InvalidInput");
}

#[test]
fn test_validate_accepts_other_commands() {
    let cli = Cli::try_parse_from(["forgeops", "releases", "--repo", "octo/widgets"]).unwrap();

    assert!(validate(&cli.command).is_ok());
}

#[test]
fn test_version_line() {
    assert!(version_line().starts_with("forgeops version "));
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[tokio::test]
async fn test_version_runs_without_token() {
    let cli = Cli::try_parse_from(["forgeops", "version"]).unwrap();
    let social = SocialSettings {
        dry_run: true,
        allowlist: Vec::new(),
        blocklist: Vec::new(),
    };
    let ctx = CommandContext {
        env: &no_env,
        prompter: None,
        page_size: 100,
        social: &social,
    };

    assert!(execute(&cli.command, None, &ctx).await.is_ok());
}

#[tokio::test]
async fn test_api_command_without_token_is_config_error() {
    let cli = Cli::try_parse_from(["forgeops", "caches", "--repo", "octo/widgets"]).unwrap();
    let social = SocialSettings {
        dry_run: true,
        allowlist: Vec::new(),
        blocklist: Vec::new(),
    };
    let ctx = CommandContext {
        env: &no_env,
        prompter: None,
        page_size: 100,
        social: &social,
    };

    let err = execute(&cli.command, None, &ctx).await.unwrap_err();

    assert_eq!(err.kind(), "ConfigError");
    assert_eq!(err.exit_code(), crate::errors::EXIT_USAGE);
}
