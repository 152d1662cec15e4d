use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::auth::{AdminUserInfo, CurrentAdminResponse, LoginRequest, LoginResponse},
};
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::{Claims, JwtKeys};

use super::services;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed token for the admin panel", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "auth"
)]
pub async fn login(
    State(db): State<Database>,
    State(keys): State<JwtKeys>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    if req.username.trim().is_empty() {
        return Err(WebError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let user = services::authenticate(db.pool(), &req.username, &req.password).await?;

    let token = keys
        .issue(&user)
        .map_err(|e| WebError::InternalServerError(format!("Failed to sign token: {}", e)))?;
    tracing::info!(username = %user.username, "Admin logged in");

    Ok(Json(LoginResponse {
        token,
        user: AdminUserInfo::from(user),
    })
    .into_response())
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The admin the token was issued to", body = CurrentAdminResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn me(Extension(claims): Extension<Claims>) -> Result<Response, WebError> {
    Ok(Json(CurrentAdminResponse {
        user: AdminUserInfo {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        },
    })
    .into_response())
}
