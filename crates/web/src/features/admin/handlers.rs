use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::{Database, dto::admin::AdminOverviewResponse, dto::question::QuestionFilter};

use crate::error::WebError;
use crate::features::{challenges, leaderboard, questions};

#[utoipa::path(
    get,
    path = "/api/admin/overview",
    responses(
        (status = 200, description = "Challenges, questions and both leaderboards", body = AdminOverviewResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn get_overview(State(db): State<Database>) -> Result<Response, WebError> {
    let question_filter = QuestionFilter::default();
    let (challenges, questions, leaderboard) = tokio::try_join!(
        challenges::services::list_challenges(db.pool()),
        questions::services::list_questions(db.pool(), &question_filter),
        leaderboard::services::list_all_entries(&db),
    )?;

    Ok(Json(AdminOverviewResponse {
        challenges,
        questions,
        leaderboard,
    })
    .into_response())
}
