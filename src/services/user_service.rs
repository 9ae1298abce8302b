use crate::error::{Error, Result};
use crate::models::user::{User, ROLE_ADMIN, ROLE_CANDIDATE, USER_COLUMNS};
use crate::utils::crypto::hash_password;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub password: Option<String>,
    pub role: String,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the account together with its empty docket, contract and
    /// work-permit rows.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let email = new_user.email.trim().to_lowercase();
        if self.get_by_email(&email).await?.is_some() {
            return Err(Error::Conflict(format!(
                "A user with email {} already exists",
                email
            )));
        }

        let password_hash = match new_user.password.as_deref() {
            Some(p) if !p.is_empty() => Some(hash_password(p)?),
            _ => None,
        };

        let mut tx = self.pool.begin().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, display_name, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&email)
        .bind(new_user.display_name.trim())
        .bind(&new_user.role)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await?;

        if new_user.role == ROLE_CANDIDATE {
            sqlx::query("INSERT INTO dockets (user_id) VALUES ($1)")
                .bind(user.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("INSERT INTO contracts (user_id) VALUES ($1)")
                .bind(user.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("INSERT INTO work_permits (user_id) VALUES ($1)")
                .bind(user.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn require_user(&self, id: Uuid) -> Result<User> {
        self.get_user(id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".into()))
    }

    /// Like [`UserService::require_user`] but also rejects admin accounts,
    /// which own no docket, contract or work permit.
    pub async fn require_candidate(&self, id: Uuid) -> Result<User> {
        let user = self.require_user(id).await?;
        if user.is_admin() {
            return Err(Error::NotFound("Candidate not found".into()));
        }
        Ok(user)
    }

    /// Portal access: the caller must be a candidate whose account is still
    /// active. An archived account keeps a valid token until it expires, so
    /// this is checked on every portal request.
    pub async fn require_active_candidate(&self, id: Uuid) -> Result<User> {
        let user = self.require_candidate(id).await?;
        ensure_active(&user)?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list_candidates(&self, archived: Option<bool>) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE role = $1 AND ($2::bool IS NULL OR archived = $2)
            ORDER BY created_at DESC
            "#,
            USER_COLUMNS
        ))
        .bind(ROLE_CANDIDATE)
        .bind(archived)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Creates the configured admin account on first start. Existing accounts
    /// are left untouched.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<()> {
        if self.get_by_email(email).await?.is_some() {
            return Ok(());
        }
        self.create_user(NewUser {
            email: email.to_string(),
            display_name: "Administrator".to_string(),
            password: Some(password.to_string()),
            role: ROLE_ADMIN.to_string(),
        })
        .await?;
        tracing::info!(email = %email, "bootstrap admin created");
        Ok(())
    }
}

pub fn ensure_active(user: &User) -> Result<()> {
    if user.archived {
        return Err(Error::Unauthorized("This account has been archived".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn archived_accounts_lose_portal_access() {
        let now = Utc::now();
        let mut user = User {
            id: Uuid::new_v4(),
            email: "cook@example.com".into(),
            display_name: "Cook".into(),
            role: ROLE_CANDIDATE.into(),
            password_hash: None,
            archived: false,
            archived_at: None,
            archived_reason: None,
            created_at: now,
            updated_at: now,
        };
        assert!(ensure_active(&user).is_ok());

        user.archived = true;
        assert!(matches!(ensure_active(&user), Err(Error::Unauthorized(_))));
    }
}
