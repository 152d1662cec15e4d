use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::challenge::{CreateChallengeRequest, UpdateChallengeRequest},
    error::StorageError,
    models::Challenge,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/today-challenge",
    responses(
        (status = 200, description = "The active challenge", body = Challenge),
        (status = 404, description = "No active challenge")
    ),
    tag = "challenges"
)]
pub async fn get_today_challenge(State(db): State<Database>) -> Result<Response, WebError> {
    let challenge = services::get_today_challenge(db.pool())
        .await
        .map_err(|e| match e {
            StorageError::NotFound => WebError::NotFound("No active challenge found".to_string()),
            other => other.into(),
        })?;

    Ok(Json(challenge).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/challenges",
    request_body = CreateChallengeRequest,
    responses(
        (status = 201, description = "Challenge created", body = Challenge),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Challenge code already exists")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn create_challenge(
    State(db): State<Database>,
    Json(req): Json<CreateChallengeRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let challenge = services::create_challenge(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(challenge)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/admin/challenges/{id}",
    params(
        ("id" = Uuid, Path, description = "Challenge ID")
    ),
    request_body = UpdateChallengeRequest,
    responses(
        (status = 200, description = "Challenge updated", body = Challenge),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Challenge not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn update_challenge(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateChallengeRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let challenge = services::update_challenge(db.pool(), id, &req).await?;

    Ok(Json(challenge).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/admin/challenges/{id}",
    params(
        ("id" = Uuid, Path, description = "Challenge ID")
    ),
    responses(
        (status = 204, description = "Challenge deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Challenge not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_challenge(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_challenge(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
