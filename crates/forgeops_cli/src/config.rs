//! Configuration management for the ForgeOps CLI.
//!
//! Settings are resolved from command-line flags, the environment, an
//! optional TOML file and built-in defaults, in that order of precedence.
//!
//! # Example TOML Configuration
//!
//! ```toml
//! [github]
//! api_url = "https://api.github.com"
//! user_agent = "forgeops-ci"
//! page_size = 50
//!
//! [social]
//! allowlist = ["octocat"]
//! blocklist = ["spammer"]
//! dry_run = true
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use github_client::{clamp_page_size, DEFAULT_API_URL, DEFAULT_PAGE_SIZE};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, Level};

use crate::errors::Error;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILENAME: &str = "forgeops.toml";

pub const TOKEN_ENV: &str = "GH_TOKEN";
pub const FALLBACK_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const SYNC_DRY_RUN_ENV: &str = "SYNC_DRY_RUN";
pub const SYNC_ALLOWLIST_ENV: &str = "SYNC_ALLOWLIST";
pub const SYNC_BLOCKLIST_ENV: &str = "SYNC_BLOCKLIST";
pub const SYNC_PAGE_SIZE_ENV: &str = "SYNC_PAGE_SIZE";
pub const LOG_JSON_ENV: &str = "LOG_JSON";
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Environment lookup, injectable for tests.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Contents of `forgeops.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub github: GitHubSection,

    #[serde(default)]
    pub social: SocialSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubSection {
    pub api_url: Option<String>,
    pub user_agent: Option<String>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSection {
    pub allowlist: Option<Vec<String>>,
    pub blocklist: Option<Vec<String>>,
    pub dry_run: Option<bool>,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file does not exist or cannot be read,
    /// and `Error::ParseTomlFile` if it is not valid TOML of the expected shape.
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read configuration file: {}", e)))?;

        toml::from_str(&content).map_err(Error::ParseTomlFile)
    }

    /// Loads `explicit` if given, otherwise `forgeops.toml` in `dir` when it
    /// exists, otherwise the empty configuration.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, Error> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = dir.join(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    debug!("No configuration file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Values taken from global command-line flags.
#[derive(Default)]
pub struct FlagOverrides {
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub config: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_json: Option<bool>,
    pub page_size: Option<i64>,
    pub dry_run: Option<bool>,
    pub allowlist: Option<String>,
    pub blocklist: Option<String>,
}

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub json: bool,
    pub level: Level,
    /// A level value that was not understood and replaced with `INFO`.
    pub rejected_level: Option<String>,
}

/// Social sync settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialSettings {
    pub dry_run: bool,
    pub allowlist: Vec<String>,
    pub blocklist: Vec<String>,
}

/// Fully resolved settings for one invocation.
pub struct Settings {
    pub token: Option<SecretString>,
    pub api_url: String,
    pub user_agent: Option<String>,
    pub page_size: u32,
    pub log: LogSettings,
    pub social: SocialSettings,
}

impl Settings {
    /// Resolves every setting with flag > environment > file > default
    /// precedence.
    pub fn resolve(flags: &FlagOverrides, env: EnvLookup<'_>, file: &FileConfig) -> Self {
        let token = non_empty(flags.token.clone())
            .or_else(|| non_empty(env(TOKEN_ENV)))
            .or_else(|| non_empty(env(FALLBACK_TOKEN_ENV)))
            .map(SecretString::from);

        let api_url = non_empty(flags.api_url.clone())
            .or_else(|| non_empty(file.github.api_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let page_size = match flags.page_size {
            Some(requested) => clamp_page_size(requested),
            None => match env(SYNC_PAGE_SIZE_ENV) {
                Some(raw) => parse_bounded(Some(&raw), DEFAULT_PAGE_SIZE as i64, 1, 100) as u32,
                None => file
                    .github
                    .page_size
                    .map(clamp_page_size)
                    .unwrap_or(DEFAULT_PAGE_SIZE),
            },
        };

        let (level, rejected_level) = parse_level(
            flags
                .log_level
                .clone()
                .or_else(|| env(LOG_LEVEL_ENV))
                .as_deref(),
        );
        let log = LogSettings {
            json: flags
                .log_json
                .unwrap_or_else(|| parse_bool(env(LOG_JSON_ENV).as_deref(), true)),
            level,
            rejected_level,
        };

        let social = SocialSettings {
            dry_run: flags.dry_run.unwrap_or_else(|| {
                let default = file.social.dry_run.unwrap_or(true);
                parse_bool(env(SYNC_DRY_RUN_ENV).as_deref(), default)
            }),
            allowlist: resolve_list(
                flags.allowlist.as_deref(),
                env(SYNC_ALLOWLIST_ENV),
                file.social.allowlist.as_ref(),
            ),
            blocklist: resolve_list(
                flags.blocklist.as_deref(),
                env(SYNC_BLOCKLIST_ENV),
                file.social.blocklist.as_ref(),
            ),
        };

        Settings {
            token,
            api_url,
            user_agent: non_empty(file.github.user_agent.clone()),
            page_size,
            log,
            social,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_list(flag: Option<&str>, env: Option<String>, file: Option<&Vec<String>>) -> Vec<String> {
    if let Some(raw) = flag {
        return parse_csv(Some(raw));
    }
    if let Some(raw) = env {
        return parse_csv(Some(&raw));
    }
    file.map(|items| {
        items
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Tolerant boolean: `1/true/yes/y/on` and `0/false/no/n/off`, any case.
/// Anything else, including a missing value, yields `default`.
pub fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "y" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "n" | "off") => false,
        _ => default,
    }
}

/// Comma-separated list, trimmed, blanks dropped.
pub fn parse_csv(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Integer within `[min, max]`. Unparsable or out-of-range values yield
/// `default`.
pub fn parse_bounded(value: Option<&str>, default: i64, min: i64, max: i64) -> i64 {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if (min..=max).contains(&n) => n,
            _ => default,
        },
        None => default,
    }
}

/// Log level name, case-insensitive. `WARNING` and `CRITICAL` are accepted
/// as aliases. Unknown names fall back to `INFO` and are returned so the
/// caller can warn once logging is up.
pub fn parse_level(value: Option<&str>) -> (Level, Option<String>) {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return (Level::INFO, None);
    };
    match raw.to_ascii_uppercase().as_str() {
        "TRACE" => (Level::TRACE, None),
        "DEBUG" => (Level::DEBUG, None),
        "INFO" => (Level::INFO, None),
        "WARN" | "WARNING" => (Level::WARN, None),
        "ERROR" | "CRITICAL" => (Level::ERROR, None),
        _ => (Level::INFO, Some(raw.to_string())),
    }
}
