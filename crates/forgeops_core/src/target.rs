//! Resolution of the repository or package owner an operation acts on.
//!
//! Values come from explicit parameters first, then the environment, then an
//! interactive [`Prompter`] when one is available.

use std::fmt;

use tracing::debug;

use crate::errors::Error;

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;

/// Environment variable holding the default repository owner.
pub const OWNER_ENV: &str = "GH_OWNER";

/// Environment variable holding the default repository name.
pub const REPO_ENV: &str = "GH_REPO";

/// Source of interactive answers.
pub trait Prompter {
    /// Asks for a value. An empty answer means "no value".
    fn ask(&self, label: &str) -> Result<String, Error>;
}

/// Environment lookup, injectable so resolution is testable without touching
/// the process environment.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// A repository to operate on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
}

impl RepoTarget {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self, Error> {
        let owner = validate_name("owner", owner.into())?;
        let repo = validate_name("repository", repo.into())?;
        Ok(Self { owner, repo })
    }

    /// Parses `owner/repo`.
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value.trim().split_once('/') {
            Some((owner, repo)) => Self::new(owner, repo),
            None => Err(Error::InvalidInput(format!(
                "expected OWNER/REPO, got '{value}'"
            ))),
        }
    }

    /// `repos/{owner}/{repo}`.
    pub fn api_path(&self) -> String {
        format!("repos/{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// The account that owns a set of packages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PackageScope {
    User(String),
    Org(String),
}

impl PackageScope {
    pub fn name(&self) -> &str {
        match self {
            PackageScope::User(name) | PackageScope::Org(name) => name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PackageScope::User(_) => "user",
            PackageScope::Org(_) => "org",
        }
    }

    /// `users/{name}` or `orgs/{name}`.
    pub fn api_prefix(&self) -> String {
        match self {
            PackageScope::User(name) => format!("users/{name}"),
            PackageScope::Org(name) => format!("orgs/{name}"),
        }
    }
}

impl fmt::Display for PackageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.name())
    }
}

fn validate_name(what: &str, value: String) -> Result<String, Error> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(Error::MissingInput(format!("{what} name")));
    }
    if value.contains('/') || value.chars().any(char::is_whitespace) {
        return Err(Error::InvalidInput(format!("invalid {what} name '{value}'")));
    }
    Ok(value)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_value(
    explicit: Option<&str>,
    env_key: &str,
    label: &str,
    env: EnvLookup<'_>,
    prompter: Option<&dyn Prompter>,
) -> Result<Option<String>, Error> {
    if let Some(value) = non_empty(explicit.map(str::to_string)) {
        return Ok(Some(value));
    }
    if let Some(value) = non_empty(env(env_key)) {
        debug!(variable = env_key, "Using value from environment");
        return Ok(Some(value));
    }
    match prompter {
        Some(prompter) => Ok(non_empty(Some(prompter.ask(label)?))),
        None => Ok(None),
    }
}

/// Resolves the repository to operate on.
///
/// `repo` may also be given as `owner/repo`, in which case `owner` is
/// ignored. Resolution with the same explicit values never prompts and always
/// yields the same target.
pub fn resolve_repo_target(
    owner: Option<&str>,
    repo: Option<&str>,
    env: EnvLookup<'_>,
    prompter: Option<&dyn Prompter>,
) -> Result<RepoTarget, Error> {
    if let Some(full) = repo.filter(|r| r.contains('/')) {
        return RepoTarget::parse(full);
    }

    let owner = resolve_value(owner, OWNER_ENV, "Repository owner: ", env, prompter)?
        .ok_or_else(|| Error::MissingInput(format!("repository owner (set --owner or {OWNER_ENV})")))?;
    let repo = resolve_value(repo, REPO_ENV, "Repository name: ", env, prompter)?
        .ok_or_else(|| Error::MissingInput(format!("repository name (set --repo or {REPO_ENV})")))?;

    RepoTarget::new(owner, repo)
}

/// Resolves the owner of the packages to operate on.
///
/// An explicit organization wins over an explicit user. Without either, the
/// prompter is asked for an organization and then a user. Non-interactive
/// runs fall back to `GH_OWNER` as an organization.
pub fn resolve_package_scope(
    user: Option<&str>,
    org: Option<&str>,
    env: EnvLookup<'_>,
    prompter: Option<&dyn Prompter>,
) -> Result<PackageScope, Error> {
    if let Some(org) = non_empty(org.map(str::to_string)) {
        return Ok(PackageScope::Org(validate_name("organization", org)?));
    }
    if let Some(user) = non_empty(user.map(str::to_string)) {
        return Ok(PackageScope::User(validate_name("user", user)?));
    }

    if let Some(prompter) = prompter {
        if let Some(org) = non_empty(Some(prompter.ask("Organization (leave empty for a user account): ")?)) {
            return Ok(PackageScope::Org(validate_name("organization", org)?));
        }
        if let Some(user) = non_empty(Some(prompter.ask("User name: ")?)) {
            return Ok(PackageScope::User(validate_name("user", user)?));
        }
    }

    match non_empty(env(OWNER_ENV)) {
        Some(owner) => Ok(PackageScope::Org(validate_name("organization", owner)?)),
        None => Err(Error::MissingInput(
            "package owner (set --org or --user)".to_string(),
        )),
    }
}
