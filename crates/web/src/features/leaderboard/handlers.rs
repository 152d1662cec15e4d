use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::leaderboard::{
        CreateLeaderboardEntryRequest, LeaderboardQuery, UpdateLeaderboardEntryRequest,
    },
    models::LeaderboardEntry,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard in rank order", body = Vec<LeaderboardEntry>),
        (status = 400, description = "Unknown leaderboard type")
    ),
    tag = "leaderboard"
)]
pub async fn list_leaderboard(
    State(db): State<Database>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Response, WebError> {
    let entry_type = query.entry_type().map_err(WebError::BadRequest)?;
    let entries = services::list_entries(&db, entry_type).await?;

    Ok(Json(entries).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/leaderboard",
    request_body = CreateLeaderboardEntryRequest,
    responses(
        (status = 201, description = "Entry created and ranked", body = LeaderboardEntry),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn create_entry(
    State(db): State<Database>,
    Json(req): Json<CreateLeaderboardEntryRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let entry = services::create_entry(&db, req).await?;

    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/admin/leaderboard/{id}",
    params(
        ("id" = Uuid, Path, description = "Leaderboard entry ID")
    ),
    request_body = UpdateLeaderboardEntryRequest,
    responses(
        (status = 200, description = "Entry updated and re-ranked", body = LeaderboardEntry),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Entry not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn update_entry(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLeaderboardEntryRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let entry = services::update_entry(&db, id, req).await?;

    Ok(Json(entry).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/admin/leaderboard/{id}",
    params(
        ("id" = Uuid, Path, description = "Leaderboard entry ID")
    ),
    responses(
        (status = 204, description = "Entry deleted and ranks closed up"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Entry not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_entry(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_entry(&db, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
