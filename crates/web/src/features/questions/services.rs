use sqlx::PgPool;
use storage::{
    dto::question::{CreateQuestionRequest, QuestionFilter, UpdateQuestionRequest},
    error::Result,
    models::Question,
    repository::question::QuestionRepository,
};
use uuid::Uuid;

/// Questions ordered by code, optionally filtered
pub async fn list_questions(pool: &PgPool, filter: &QuestionFilter) -> Result<Vec<Question>> {
    let repo = QuestionRepository::new(pool);
    repo.list(filter).await
}

pub async fn create_question(pool: &PgPool, request: &CreateQuestionRequest) -> Result<Question> {
    let repo = QuestionRepository::new(pool);
    repo.create(request).await
}

pub async fn update_question(
    pool: &PgPool,
    id: Uuid,
    request: &UpdateQuestionRequest,
) -> Result<Question> {
    let repo = QuestionRepository::new(pool);

    let existing = repo.find_by_id(id).await?;
    repo.update(&existing, request).await
}

pub async fn delete_question(pool: &PgPool, id: Uuid) -> Result<()> {
    let repo = QuestionRepository::new(pool);
    repo.delete(id).await
}
