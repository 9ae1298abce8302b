use crate::error::{Error, Result};
use crate::models::docket::{Docket, DocketField, DocketRow, Reference};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const DOCKET_COLUMNS: &str = r#"user_id, passport_front_url, passport_last_url, passport_photo_url,
    resume_url, offer_letter_url, permanent_address_url, current_address_url,
    education_files, experience_files, other_certifications, "references", updated_at"#;

#[derive(Clone)]
pub struct DocketService {
    pool: PgPool,
}

impl DocketService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<Docket>> {
        let row = sqlx::query_as::<_, DocketRow>(&format!(
            "SELECT {} FROM dockets WHERE user_id = $1",
            DOCKET_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Docket::from))
    }

    /// All dockets of non-archived candidates, keyed by owner.
    pub async fn list_active(&self) -> Result<Vec<Docket>> {
        let rows = sqlx::query_as::<_, DocketRow>(&format!(
            r#"
            SELECT {}
            FROM dockets d
            JOIN users u ON u.id = d.user_id
            WHERE u.archived = FALSE
            ORDER BY u.created_at DESC
            "#,
            prefixed_columns("d")
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Docket::from).collect())
    }

    /// Records one uploaded file. Single fields are replaced, list fields get
    /// the URL appended. The docket row is created if it is somehow missing.
    pub async fn attach_file(&self, user_id: Uuid, field: DocketField, url: &str) -> Result<Docket> {
        let column = field.column();
        let assignment = if field.is_list() {
            format!("{column} = array_append(dockets.{column}, $2)")
        } else {
            format!("{column} = $2")
        };
        let initial = if field.is_list() { "ARRAY[$2]" } else { "$2" };

        let row = sqlx::query_as::<_, DocketRow>(&format!(
            r#"
            INSERT INTO dockets (user_id, {column})
            VALUES ($1, {initial})
            ON CONFLICT (user_id) DO UPDATE SET {assignment}, updated_at = NOW()
            RETURNING {columns}
            "#,
            column = column,
            initial = initial,
            assignment = assignment,
            columns = DOCKET_COLUMNS,
        ))
        .bind(user_id)
        .bind(url)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %user_id, field = field.wire_name(), "docket file attached");
        Ok(row.into())
    }

    pub async fn replace_references(&self, user_id: Uuid, references: Vec<Reference>) -> Result<Docket> {
        let row = sqlx::query_as::<_, DocketRow>(&format!(
            r#"
            UPDATE dockets
            SET "references" = $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING {}
            "#,
            DOCKET_COLUMNS
        ))
        .bind(user_id)
        .bind(Json(references))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Docket not found".into()))?;
        Ok(row.into())
    }
}

fn prefixed_columns(alias: &str) -> String {
    DOCKET_COLUMNS
        .split(',')
        .map(|c| format!("{}.{}", alias, c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_columns_qualify_every_column() {
        let cols = prefixed_columns("d");
        assert!(cols.starts_with("d.user_id, d.passport_front_url"));
        assert!(cols.contains("d.\"references\""));
        assert!(cols.ends_with("d.updated_at"));
    }
}
