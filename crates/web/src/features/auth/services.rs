use anyhow::Context;
use sqlx::PgPool;
use storage::{error::StorageError, models::AdminUser, repository::admin_user::AdminUserRepository};

use super::password;
use crate::error::{WebError, WebResult};

fn invalid_credentials() -> WebError {
    WebError::Unauthorized("Invalid username or password".to_string())
}

/// Looks up the admin and checks the password off the async runtime.
pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> WebResult<AdminUser> {
    let repo = AdminUserRepository::new(pool);

    let user = match repo.find_by_username(username.trim()).await {
        Ok(user) => user,
        Err(StorageError::NotFound) => {
            tracing::warn!(username = %username.trim(), "Login attempt for unknown admin");
            return Err(invalid_credentials());
        }
        Err(e) => return Err(e.into()),
    };

    let candidate = password.to_string();
    let stored_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || {
        password::verify_password(&candidate, &stored_hash)
    })
    .await
    .map_err(|e| WebError::InternalServerError(format!("Password check failed: {}", e)))?;

    if !valid {
        tracing::warn!(username = %user.username, "Login attempt with wrong password");
        return Err(invalid_credentials());
    }

    Ok(user)
}

/// Creates the first admin account from configuration when none exists.
pub async fn ensure_admin(
    pool: &PgPool,
    username: Option<&str>,
    password: Option<&str>,
) -> anyhow::Result<()> {
    let repo = AdminUserRepository::new(pool);

    if repo.count().await.context("Failed to count admin users")? > 0 {
        return Ok(());
    }

    let (Some(username), Some(password)) = (username, password) else {
        tracing::warn!("No admin user exists and ADMIN_USERNAME/ADMIN_PASSWORD are not set");
        return Ok(());
    };

    let plain = password.to_string();
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .context("Password hashing task failed")?
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;

    let admin = repo
        .create(username, &hash)
        .await
        .context("Failed to create admin user")?;
    tracing::info!(username = %admin.username, "Created initial admin user");

    Ok(())
}
