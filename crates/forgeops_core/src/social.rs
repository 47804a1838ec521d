//! Follow/unfollow synchronization for the authenticated user.
//!
//! Followers the user does not follow back are followed, and accounts the
//! user follows that do not follow back are unfollowed. The blocklist is never
//! followed and the allowlist is never unfollowed. Organizations cannot be
//! followed through the REST API, so only user logins are handled.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use github_client::{Paginator, RequestExecutor, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::errors::Error;
use crate::packages::encode_segment;

#[cfg(test)]
#[path = "social_tests.rs"]
mod tests;

/// Statuses that mean the follow state is now what was asked for.
const FOLLOW_OK: &[u16] = &[204, 304];

/// Trims entries and drops blanks.
pub fn normalize_logins<I, S>(logins: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    logins
        .into_iter()
        .map(|l| l.as_ref().trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Users to follow and unfollow, each sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub to_follow: Vec<String>,
    pub to_unfollow: Vec<String>,
}

/// `to_follow = (followers - following) - blocklist` and
/// `to_unfollow = (following - followers) - allowlist`.
pub fn plan_sync(
    followers: &BTreeSet<String>,
    following: &BTreeSet<String>,
    allowlist: &BTreeSet<String>,
    blocklist: &BTreeSet<String>,
) -> SyncPlan {
    let to_follow = followers
        .difference(following)
        .filter(|login| !blocklist.contains(*login))
        .cloned()
        .collect();
    let to_unfollow = following
        .difference(followers)
        .filter(|login| !allowlist.contains(*login))
        .cloned()
        .collect();

    SyncPlan {
        to_follow,
        to_unfollow,
    }
}

/// Inputs of a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub dry_run: bool,
    pub allowlist: Vec<String>,
    pub blocklist: Vec<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            allowlist: Vec::new(),
            blocklist: Vec::new(),
        }
    }
}

/// Audit record of one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub dry_run: bool,
    pub followers_count: usize,
    pub following_count: usize,
    pub to_follow: Vec<String>,
    pub to_unfollow: Vec<String>,
    pub followed: Vec<String>,
    pub unfollowed: Vec<String>,
    /// Login to reason, e.g. `dry_run_follow` or `error:NotFound`.
    pub skipped: BTreeMap<String, String>,
    pub allowlist: Vec<String>,
    pub blocklist: Vec<String>,
}

impl SyncReport {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Follow,
    Unfollow,
}

impl Action {
    fn dry_run_reason(self) -> &'static str {
        match self {
            Action::Follow => "dry_run_follow",
            Action::Unfollow => "dry_run_unfollow",
        }
    }

    fn error_event(self) -> &'static str {
        match self {
            Action::Follow => "follow_error",
            Action::Unfollow => "unfollow_error",
        }
    }
}

/// Social endpoints of the authenticated user.
pub struct SocialClient<'a> {
    executor: &'a RequestExecutor,
    page_size: u32,
}

impl<'a> SocialClient<'a> {
    pub fn new(executor: &'a RequestExecutor) -> Self {
        Self {
            executor,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Logins of the users following the authenticated user.
    pub async fn followers(&self) -> Result<BTreeSet<String>, Error> {
        let followers = self.logins("user/followers").await?;
        info!(event = "followers_fetched", count = followers.len(), "Fetched followers");
        Ok(followers)
    }

    /// Logins of the users the authenticated user follows.
    pub async fn following(&self) -> Result<BTreeSet<String>, Error> {
        let following = self.logins("user/following").await?;
        info!(event = "following_fetched", count = following.len(), "Fetched following");
        Ok(following)
    }

    async fn logins(&self, path: &str) -> Result<BTreeSet<String>, Error> {
        let mut pages = Paginator::new(self.executor, path).with_page_size(self.page_size);
        let mut logins = BTreeSet::new();
        while let Some(user) = pages.next_record().await? {
            match user.login() {
                Some(login) => {
                    logins.insert(login.to_string());
                }
                None => warn!(
                    event = "record_skipped",
                    reason = "missing login",
                    "Skipping user without login"
                ),
            }
        }
        Ok(logins)
    }

    pub async fn follow(&self, username: &str) -> Result<(), Error> {
        let path = following_path(username)?;
        let response = self.executor.put(&path, FOLLOW_OK).await?;
        info!(event = "follow_user", username, status = response.status, "Followed user");
        Ok(())
    }

    pub async fn unfollow(&self, username: &str) -> Result<(), Error> {
        let path = following_path(username)?;
        let response = self.executor.delete(&path, FOLLOW_OK).await?;
        info!(event = "unfollow_user", username, status = response.status, "Unfollowed user");
        Ok(())
    }

    /// Runs one synchronization and returns its report.
    ///
    /// A failure for one user, including a 401 or 403, is recorded in
    /// `skipped` as `error:<kind>` and the run continues.
    #[instrument(skip(self, options), fields(dry_run = options.dry_run))]
    pub async fn sync(&self, options: &SyncOptions) -> Result<SyncReport, Error> {
        let started_at = Utc::now();
        let allowlist = normalize_logins(&options.allowlist);
        let blocklist = normalize_logins(&options.blocklist);

        let followers = self.followers().await?;
        let following = self.following().await?;
        let plan = plan_sync(&followers, &following, &allowlist, &blocklist);

        let mut skipped = BTreeMap::new();
        let followed = self
            .apply(Action::Follow, &plan.to_follow, options.dry_run, &mut skipped)
            .await;
        let unfollowed = self
            .apply(Action::Unfollow, &plan.to_unfollow, options.dry_run, &mut skipped)
            .await;

        let report = SyncReport {
            started_at,
            completed_at: Utc::now(),
            dry_run: options.dry_run,
            followers_count: followers.len(),
            following_count: following.len(),
            to_follow: plan.to_follow,
            to_unfollow: plan.to_unfollow,
            followed,
            unfollowed,
            skipped,
            allowlist: allowlist.into_iter().collect(),
            blocklist: blocklist.into_iter().collect(),
        };
        info!(
            event = "sync_complete",
            followers = report.followers_count,
            following = report.following_count,
            to_follow = report.to_follow.len(),
            to_unfollow = report.to_unfollow.len(),
            followed = report.followed.len(),
            unfollowed = report.unfollowed.len(),
            skipped = report.skipped.len(),
            "Social sync complete"
        );
        Ok(report)
    }

    /// Applies `action` to each user in order and returns those that succeeded.
    async fn apply(
        &self,
        action: Action,
        users: &[String],
        dry_run: bool,
        skipped: &mut BTreeMap<String, String>,
    ) -> Vec<String> {
        let mut done = Vec::new();
        for username in users {
            if dry_run {
                info!(event = action.dry_run_reason(), username = %username, "Dry run, no change made");
                skipped.insert(username.clone(), action.dry_run_reason().to_string());
                continue;
            }

            let result = match action {
                Action::Follow => self.follow(username).await,
                Action::Unfollow => self.unfollow(username).await,
            };
            match result {
                Ok(()) => done.push(username.clone()),
                Err(err) => {
                    warn!(
                        event = action.error_event(),
                        username = %username,
                        error_type = err.kind(),
                        error_message = %err,
                        "Social action failed, continuing"
                    );
                    skipped.insert(username.clone(), format!("error:{}", err.kind()));
                }
            }
        }
        done
    }
}

fn following_path(username: &str) -> Result<String, Error> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::InvalidInput("username must not be empty".to_string()));
    }
    Ok(format!("user/following/{}", encode_segment(username)))
}
