use crate::error::Result;
use crate::models::audit_log::AuditLog;
use serde_json::Value as JsonValue;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

#[derive(Clone)]
pub struct AuditService {
    pool: PgPool,
}

impl AuditService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn log(
        &self,
        actor_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Uuid,
        changes: Option<JsonValue>,
    ) -> Result<AuditLog> {
        record(&self.pool, actor_id, action, entity_type, entity_id, changes).await
    }

    pub async fn list_for_entity(&self, entity_type: &str, entity_id: Uuid) -> Result<Vec<AuditLog>> {
        let rows = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, actor_id, action, entity_type, entity_id, changes, created_at
            FROM audit_logs
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Writes an audit row on any executor, so callers inside a transaction keep
/// the log entry atomic with the change it describes.
pub async fn record<'e, E>(
    executor: E,
    actor_id: Option<Uuid>,
    action: &str,
    entity_type: &str,
    entity_id: Uuid,
    changes: Option<JsonValue>,
) -> Result<AuditLog>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, AuditLog>(
        r#"
        INSERT INTO audit_logs (actor_id, action, entity_type, entity_id, changes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, actor_id, action, entity_type, entity_id, changes, created_at
        "#,
    )
    .bind(actor_id)
    .bind(action)
    .bind(entity_type)
    .bind(entity_id)
    .bind(changes)
    .fetch_one(executor)
    .await?;
    Ok(row)
}
