use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::AdminUser;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "username and password are required"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "username and password are required"))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdminUserInfo {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

impl From<AdminUser> for AdminUserInfo {
    fn from(user: AdminUser) -> Self {
        Self {
            id: user.admin_user_id,
            username: user.username,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminUserInfo,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CurrentAdminResponse {
    pub user: AdminUserInfo,
}
