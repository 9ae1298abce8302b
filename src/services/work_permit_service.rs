use crate::error::{Error, Result};
use crate::models::work_permit::{transition_warnings, TransitionWarning, WorkPermit, WorkPermitStatus};
use crate::services::audit_service;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

const WORK_PERMIT_COLUMNS: &str =
    "user_id, status, tracking_code, application_date, final_docket_url, notes, updated_at";

/// Partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct WorkPermitChanges {
    pub status: Option<WorkPermitStatus>,
    pub tracking_code: Option<String>,
    pub application_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPermitUpdate {
    pub work_permit: WorkPermit,
    pub warnings: Vec<TransitionWarning>,
}

#[derive(Clone)]
pub struct WorkPermitService {
    pool: PgPool,
    auto_approve_on_final_docket: bool,
}

impl WorkPermitService {
    pub fn new(pool: PgPool, auto_approve_on_final_docket: bool) -> Self {
        Self {
            pool,
            auto_approve_on_final_docket,
        }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<WorkPermit>> {
        let permit = sqlx::query_as::<_, WorkPermit>(&format!(
            "SELECT {} FROM work_permits WHERE user_id = $1",
            WORK_PERMIT_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(permit)
    }

    pub async fn require(&self, user_id: Uuid) -> Result<WorkPermit> {
        self.get(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Work permit not found".into()))
    }

    pub async fn list_active(&self) -> Result<Vec<WorkPermit>> {
        let permits = sqlx::query_as::<_, WorkPermit>(&format!(
            r#"
            SELECT {}
            FROM work_permits
            WHERE user_id IN (SELECT id FROM users WHERE archived = FALSE)
            "#,
            WORK_PERMIT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(permits)
    }

    /// Applies an admin edit. Any status may follow any other; questionable
    /// moves come back as warnings instead of errors.
    pub async fn update(&self, actor_id: Uuid, user_id: Uuid, changes: WorkPermitChanges) -> Result<WorkPermitUpdate> {
        let current = self.require(user_id).await?;

        let tracking_code = changes
            .tracking_code
            .as_deref()
            .map(str::trim)
            .map(str::to_string)
            .or_else(|| current.tracking_code.clone());
        let target = changes.status.unwrap_or(current.status);
        let warnings = transition_warnings(current.status, target, tracking_code.as_deref());

        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query_as::<_, WorkPermit>(&format!(
            r#"
            UPDATE work_permits SET
                status = COALESCE($2, status),
                tracking_code = COALESCE(NULLIF($3, ''), tracking_code),
                application_date = COALESCE($4, application_date),
                notes = COALESCE($5, notes),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {}
            "#,
            WORK_PERMIT_COLUMNS
        ))
        .bind(user_id)
        .bind(changes.status)
        .bind(changes.tracking_code.as_deref().map(str::trim))
        .bind(changes.application_date)
        .bind(changes.notes.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        audit_service::record(
            &mut *tx,
            Some(actor_id),
            "work_permit.updated",
            "user",
            user_id,
            Some(json!({
                "from": current.status,
                "to": updated.status,
                "trackingCode": updated.tracking_code,
                "warnings": warnings,
            })),
        )
        .await?;
        tx.commit().await?;

        if current.status != updated.status {
            tracing::info!(
                user_id = %user_id,
                from = current.status.as_str(),
                to = updated.status.as_str(),
                "work permit status changed"
            );
        }

        Ok(WorkPermitUpdate {
            work_permit: updated,
            warnings,
        })
    }

    /// Stores the final docket. Refused before the application is filed.
    /// With auto-approval on, an upload while the application is pending also
    /// moves the permit to `approved`.
    pub async fn attach_final_docket(&self, actor_id: Uuid, user_id: Uuid, url: &str) -> Result<WorkPermit> {
        let current = self.require(user_id).await?;
        ensure_final_docket_allowed(current.status)?;

        let next_status = status_after_final_docket(current.status, self.auto_approve_on_final_docket);

        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query_as::<_, WorkPermit>(&format!(
            r#"
            UPDATE work_permits SET
                final_docket_url = $2,
                status = $3,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {}
            "#,
            WORK_PERMIT_COLUMNS
        ))
        .bind(user_id)
        .bind(url)
        .bind(next_status)
        .fetch_one(&mut *tx)
        .await?;

        audit_service::record(
            &mut *tx,
            Some(actor_id),
            "work_permit.final_docket_uploaded",
            "user",
            user_id,
            Some(json!({ "url": url, "from": current.status, "to": next_status })),
        )
        .await?;
        tx.commit().await?;

        Ok(updated)
    }
}

pub fn ensure_final_docket_allowed(status: WorkPermitStatus) -> Result<()> {
    if status.allows_final_docket_upload() {
        Ok(())
    } else {
        Err(Error::BadRequest(format!(
            "Final docket cannot be uploaded while the work permit is in {}",
            status.as_str()
        )))
    }
}

/// Status a permit ends up in once its final docket is stored.
pub fn status_after_final_docket(current: WorkPermitStatus, auto_approve: bool) -> WorkPermitStatus {
    if auto_approve && current.auto_approves_on_final_docket() {
        WorkPermitStatus::Approved
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_docket_only_approves_when_switched_on() {
        use WorkPermitStatus::*;
        assert_eq!(status_after_final_docket(Applied, true), Approved);
        assert_eq!(status_after_final_docket(AwaitingDecision, true), Approved);
        assert_eq!(status_after_final_docket(Approved, true), Approved);
        assert_eq!(status_after_final_docket(Applied, false), Applied);
        assert_eq!(status_after_final_docket(AwaitingDecision, false), AwaitingDecision);
    }

    #[test]
    fn final_docket_refused_during_preparation() {
        assert!(matches!(
            ensure_final_docket_allowed(WorkPermitStatus::Preparation),
            Err(Error::BadRequest(_))
        ));
        assert!(ensure_final_docket_allowed(WorkPermitStatus::Applied).is_ok());
        assert!(ensure_final_docket_allowed(WorkPermitStatus::Rejected).is_err());
    }
}
