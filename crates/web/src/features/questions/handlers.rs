use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::question::{CreateQuestionRequest, QuestionFilter, UpdateQuestionRequest},
    models::Question,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/questions",
    params(QuestionFilter),
    responses(
        (status = 200, description = "Questions ordered by code", body = Vec<Question>)
    ),
    tag = "questions"
)]
pub async fn list_questions(
    State(db): State<Database>,
    Query(filter): Query<QuestionFilter>,
) -> Result<Response, WebError> {
    let questions = services::list_questions(db.pool(), &filter).await?;

    Ok(Json(questions).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/questions",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = Question),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Question code already exists")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn create_question(
    State(db): State<Database>,
    Json(req): Json<CreateQuestionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let question = services::create_question(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(question)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/admin/questions/{id}",
    params(
        ("id" = Uuid, Path, description = "Question ID")
    ),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = Question),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Question not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn update_question(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateQuestionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let question = services::update_question(db.pool(), id, &req).await?;

    Ok(Json(question).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/admin/questions/{id}",
    params(
        ("id" = Uuid, Path, description = "Question ID")
    ),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Question not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_question(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_question(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
