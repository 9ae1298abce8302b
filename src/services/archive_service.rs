//! Archiving of stale candidate accounts.
//!
//! A user becomes eligible once they are not archived and their account is at
//! least [`ArchivePolicy::after`] old. Archive and restore are idempotent: a
//! repeat call reports `changed: false` instead of failing.

use crate::error::{Error, Result};
use crate::models::user::{User, ROLE_CANDIDATE, USER_COLUMNS};
use crate::services::audit_service;
use crate::utils::time::days_since;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub const DEFAULT_ARCHIVE_AFTER_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchivePolicy {
    pub after: Duration,
}

impl Default for ArchivePolicy {
    fn default() -> Self {
        Self::after_days(DEFAULT_ARCHIVE_AFTER_DAYS)
    }
}

impl ArchivePolicy {
    pub fn after_days(days: i64) -> Self {
        Self {
            after: Duration::days(days),
        }
    }

    pub fn is_eligible(&self, user: &User, now: DateTime<Utc>) -> bool {
        !user.archived && now - user.created_at >= self.after
    }

    pub fn auto_archive_reason(&self) -> String {
        format!("Automatically archived after {} days", self.after.num_days())
    }

    /// Archives every eligible user in place. Running it again straight
    /// after archives nothing.
    pub fn auto_archive(&self, users: &mut [User], now: DateTime<Utc>) -> AutoArchiveReport {
        let reason = self.auto_archive_reason();
        let mut report = AutoArchiveReport::default();
        for user in users.iter_mut().filter(|u| self.is_eligible(u, now)) {
            user.archived = true;
            user.archived_at = Some(now);
            user.archived_reason = Some(reason.clone());
            report.archived_count += 1;
            report.archived_ids.push(user.id);
        }
        report
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoArchiveReport {
    pub archived_count: usize,
    pub archived_ids: Vec<Uuid>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveOutcome {
    pub user: User,
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleUser {
    #[serde(flatten)]
    pub user: User,
    pub days_since_created: i64,
}

#[derive(Clone)]
pub struct ArchiveService {
    pool: PgPool,
    policy: ArchivePolicy,
}

impl ArchiveService {
    pub fn new(pool: PgPool, policy: ArchivePolicy) -> Self {
        Self { pool, policy }
    }

    pub fn policy(&self) -> ArchivePolicy {
        self.policy
    }

    async fn active_candidates(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE archived = FALSE AND role = $1 ORDER BY created_at ASC",
            USER_COLUMNS
        ))
        .bind(ROLE_CANDIDATE)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn list_eligible(&self, now: DateTime<Utc>) -> Result<Vec<EligibleUser>> {
        let users = self.active_candidates().await?;
        Ok(users
            .into_iter()
            .filter(|u| self.policy.is_eligible(u, now))
            .map(|user| EligibleUser {
                days_since_created: days_since(user.created_at, now),
                user,
            })
            .collect())
    }

    pub async fn archive(&self, actor_id: Option<Uuid>, user_id: Uuid, reason: &str) -> Result<ArchiveOutcome> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::BadRequest("An archive reason is required".into()));
        }

        let mut tx = self.pool.begin().await?;
        let archived = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET archived = TRUE, archived_at = NOW(), archived_reason = $2, updated_at = NOW()
            WHERE id = $1 AND archived = FALSE AND role = $3
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(reason)
        .bind(ROLE_CANDIDATE)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user) = archived else {
            tx.rollback().await?;
            let user = self.existing_candidate(user_id).await?;
            tracing::debug!(user_id = %user_id, "archive skipped, user already archived");
            return Ok(ArchiveOutcome { user, changed: false });
        };

        audit_service::record(
            &mut *tx,
            actor_id,
            "user.archived",
            "user",
            user_id,
            Some(json!({ "reason": reason })),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(user_id = %user_id, "user archived");
        Ok(ArchiveOutcome { user, changed: true })
    }

    pub async fn restore(&self, actor_id: Option<Uuid>, user_id: Uuid) -> Result<ArchiveOutcome> {
        let mut tx = self.pool.begin().await?;
        let restored = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET archived = FALSE, archived_at = NULL, archived_reason = NULL, updated_at = NOW()
            WHERE id = $1 AND archived = TRUE AND role = $2
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(ROLE_CANDIDATE)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user) = restored else {
            tx.rollback().await?;
            let user = self.existing_candidate(user_id).await?;
            tracing::debug!(user_id = %user_id, "restore skipped, user already active");
            return Ok(ArchiveOutcome { user, changed: false });
        };

        audit_service::record(&mut *tx, actor_id, "user.restored", "user", user_id, None).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user_id, "user restored");
        Ok(ArchiveOutcome { user, changed: true })
    }

    async fn existing_candidate(&self, user_id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND role = $2",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(ROLE_CANDIDATE)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))
    }

    /// Archives every eligible candidate one by one. A failure on one user is
    /// recorded in the report and the batch carries on.
    pub async fn run_auto_archive(&self, actor_id: Option<Uuid>, now: DateTime<Utc>) -> Result<AutoArchiveReport> {
        let reason = self.policy.auto_archive_reason();
        let candidates = self.active_candidates().await?;
        let mut report = AutoArchiveReport::default();

        for user in candidates.iter().filter(|u| self.policy.is_eligible(u, now)) {
            match self.archive(actor_id, user.id, &reason).await {
                Ok(outcome) if outcome.changed => {
                    report.archived_count += 1;
                    report.archived_ids.push(user.id);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(user_id = %user.id, error = %e, "auto-archive failed for user");
                    report.errors.push(format!("{}: {}", user.email, e));
                }
            }
        }

        tracing::info!(
            archived = report.archived_count,
            errors = report.errors.len(),
            "auto-archive finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_created_days_ago(days: i64, now: DateTime<Utc>) -> User {
        let created_at = now - Duration::days(days);
        User {
            id: Uuid::new_v4(),
            email: format!("cook{}@example.com", days),
            display_name: format!("Cook {}", days),
            role: ROLE_CANDIDATE.to_string(),
            password_hash: None,
            archived: false,
            archived_at: None,
            archived_reason: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn eligibility_boundary_is_inclusive_at_365_days() {
        let now = Utc::now();
        let policy = ArchivePolicy::default();
        assert!(policy.is_eligible(&user_created_days_ago(365, now), now));
        assert!(!policy.is_eligible(&user_created_days_ago(364, now), now));
    }

    #[test]
    fn archived_users_are_never_eligible() {
        let now = Utc::now();
        let mut user = user_created_days_ago(800, now);
        user.archived = true;
        assert!(!ArchivePolicy::default().is_eligible(&user, now));
    }

    #[test]
    fn auto_archive_takes_only_eligible_users_and_is_idempotent() {
        let now = Utc::now();
        let policy = ArchivePolicy::default();
        let mut users = vec![
            user_created_days_ago(400, now),
            user_created_days_ago(10, now),
            user_created_days_ago(365, now),
            user_created_days_ago(364, now),
            user_created_days_ago(1000, now),
        ];

        let first = policy.auto_archive(&mut users, now);
        assert_eq!(first.archived_count, 3);
        assert!(first.errors.is_empty());
        assert_eq!(users.iter().filter(|u| u.archived).count(), 3);
        assert!(!users[1].archived);
        assert!(!users[3].archived);
        assert_eq!(
            users[0].archived_reason.as_deref(),
            Some("Automatically archived after 365 days")
        );

        let second = policy.auto_archive(&mut users, now);
        assert_eq!(second.archived_count, 0);
        assert_eq!(users.iter().filter(|u| u.archived).count(), 3);
    }

    #[test]
    fn custom_policy_changes_the_window() {
        let now = Utc::now();
        let policy = ArchivePolicy::after_days(30);
        assert!(policy.is_eligible(&user_created_days_ago(30, now), now));
        assert!(!policy.is_eligible(&user_created_days_ago(29, now), now));
    }
}
