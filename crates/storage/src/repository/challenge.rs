use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::challenge::{CreateChallengeRequest, UpdateChallengeRequest};
use crate::error::{Result, StorageError};
use crate::models::Challenge;

const CHALLENGE_COLUMNS: &str = "challenge_id, code, title, difficulty, category, link, \
                                 description, is_active, status, created_at, updated_at";

pub const DEFAULT_CHALLENGE_STATUS: &str = "Ready for Debugging";

const SINGLE_ACTIVE_INDEX: &str = "challenges_single_active_idx";

pub struct ChallengeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChallengeRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all challenges, newest first
    pub async fn list(&self) -> Result<Vec<Challenge>> {
        let challenges = sqlx::query_as::<_, Challenge>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM challenges ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(challenges)
    }

    /// The challenge currently shown as today's challenge
    pub async fn find_active(&self) -> Result<Challenge> {
        sqlx::query_as::<_, Challenge>(&format!(
            r#"
            SELECT {CHALLENGE_COLUMNS}
            FROM challenges
            WHERE is_active
            ORDER BY updated_at DESC
            LIMIT 1
            "#
        ))
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Challenge> {
        sqlx::query_as::<_, Challenge>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE challenge_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Create a challenge. Activating it deactivates every other challenge.
    pub async fn create(&self, req: &CreateChallengeRequest) -> Result<Challenge> {
        let is_active = req.is_active.unwrap_or(false);
        let status = req.status.as_deref().unwrap_or(DEFAULT_CHALLENGE_STATUS);

        let mut tx = self.pool.begin().await?;

        if is_active {
            deactivate_others(&mut tx, None).await?;
        }

        let challenge = sqlx::query_as::<_, Challenge>(&format!(
            r#"
            INSERT INTO challenges (code, title, difficulty, category, link, description, is_active, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {CHALLENGE_COLUMNS}
            "#
        ))
        .bind(req.code.trim())
        .bind(&req.title)
        .bind(req.difficulty)
        .bind(&req.category)
        .bind(&req.link)
        .bind(&req.description)
        .bind(is_active)
        .bind(status)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_error)?;

        tx.commit().await?;

        Ok(challenge)
    }

    /// Update an existing challenge
    pub async fn update(
        &self,
        existing: &Challenge,
        req: &UpdateChallengeRequest,
    ) -> Result<Challenge> {
        let code = req
            .code
            .as_deref()
            .map(str::trim)
            .unwrap_or(existing.code.as_str());
        let title = req.title.as_ref().unwrap_or(&existing.title);
        let difficulty = req.difficulty.unwrap_or(existing.difficulty);
        let category = req.category.as_ref().unwrap_or(&existing.category);
        let link = req.link.as_ref().unwrap_or(&existing.link);
        let description = req.description.as_ref().unwrap_or(&existing.description);
        let status = req.status.as_ref().unwrap_or(&existing.status);
        let is_active = req.is_active.unwrap_or(existing.is_active);

        let mut tx = self.pool.begin().await?;

        if req.is_active == Some(true) {
            deactivate_others(&mut tx, Some(existing.challenge_id)).await?;
        }

        let challenge = sqlx::query_as::<_, Challenge>(&format!(
            r#"
            UPDATE challenges
            SET code = $2,
                title = $3,
                difficulty = $4,
                category = $5,
                link = $6,
                description = $7,
                status = $8,
                is_active = $9,
                updated_at = NOW()
            WHERE challenge_id = $1
            RETURNING {CHALLENGE_COLUMNS}
            "#
        ))
        .bind(existing.challenge_id)
        .bind(code)
        .bind(title)
        .bind(difficulty)
        .bind(category)
        .bind(link)
        .bind(description)
        .bind(status)
        .bind(is_active)
        .fetch_optional(&mut *tx)
        .await
        .map_err(write_error)?
        .ok_or(StorageError::NotFound)?;

        tx.commit().await?;

        Ok(challenge)
    }

    /// Delete a challenge by ID
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM challenges WHERE challenge_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

/// Tells a lost race for the single active slot apart from a duplicate code.
fn write_error(error: sqlx::Error) -> StorageError {
    let error = StorageError::from(error);
    if error.is_unique_violation() && error.constraint() == Some(SINGLE_ACTIVE_INDEX) {
        return StorageError::ConstraintViolation(
            "Another challenge was activated at the same time".to_string(),
        );
    }
    error.on_unique_violation("Challenge code already exists")
}

async fn deactivate_others(
    tx: &mut Transaction<'_, Postgres>,
    keep: Option<Uuid>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE challenges
        SET is_active = FALSE, updated_at = NOW()
        WHERE is_active AND ($1::uuid IS NULL OR challenge_id <> $1)
        "#,
    )
    .bind(keep)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!(
            count = result.rows_affected(),
            "Deactivated previously active challenges"
        );
    }

    Ok(())
}
