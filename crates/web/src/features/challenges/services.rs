use sqlx::PgPool;
use storage::{
    dto::challenge::{CreateChallengeRequest, UpdateChallengeRequest},
    error::Result,
    models::Challenge,
    repository::challenge::ChallengeRepository,
};
use uuid::Uuid;

/// All challenges, newest first
pub async fn list_challenges(pool: &PgPool) -> Result<Vec<Challenge>> {
    let repo = ChallengeRepository::new(pool);
    repo.list().await
}

/// The currently active challenge
pub async fn get_today_challenge(pool: &PgPool) -> Result<Challenge> {
    let repo = ChallengeRepository::new(pool);
    repo.find_active().await
}

pub async fn create_challenge(pool: &PgPool, request: &CreateChallengeRequest) -> Result<Challenge> {
    let repo = ChallengeRepository::new(pool);
    let challenge = repo.create(request).await?;

    tracing::info!(
        challenge_id = %challenge.challenge_id,
        is_active = challenge.is_active,
        "Created challenge"
    );
    Ok(challenge)
}

pub async fn update_challenge(
    pool: &PgPool,
    id: Uuid,
    request: &UpdateChallengeRequest,
) -> Result<Challenge> {
    let repo = ChallengeRepository::new(pool);

    let existing = repo.find_by_id(id).await?;
    repo.update(&existing, request).await
}

pub async fn delete_challenge(pool: &PgPool, id: Uuid) -> Result<()> {
    let repo = ChallengeRepository::new(pool);
    repo.delete(id).await
}
