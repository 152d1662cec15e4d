use chrono::NaiveDateTime;
use sqlx::FromRow;
use uuid::Uuid;

/// Admin account. Never serialized directly since it carries the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct AdminUser {
    pub admin_user_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}
