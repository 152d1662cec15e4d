use sqlx::PgPool;

use crate::error::{Result, StorageError};
use crate::models::AdminUser;

pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<AdminUser> {
        sqlx::query_as::<_, AdminUser>(
            r#"
            SELECT admin_user_id, username, password_hash, role, created_at
            FROM admin_users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admin_users")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    pub async fn create(&self, username: &str, password_hash: &str) -> Result<AdminUser> {
        sqlx::query_as::<_, AdminUser>(
            r#"
            INSERT INTO admin_users (username, password_hash)
            VALUES ($1, $2)
            RETURNING admin_user_id, username, password_hash, role, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).on_unique_violation("Username already exists"))
    }
}
