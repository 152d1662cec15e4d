use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::dto::question::{CreateQuestionRequest, QuestionFilter, UpdateQuestionRequest};
use crate::error::{Result, StorageError};
use crate::models::{DEFAULT_QUESTION_LINK, Question};

const QUESTION_COLUMNS: &str = "question_id, code, title, difficulty, category, description, \
                                snippet, link, created_at, updated_at";

pub struct QuestionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> QuestionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List questions matching the filter, ordered by code
    pub async fn list(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE 1=1"
        ));

        if let Some(category) = filter.category() {
            query.push(" AND LOWER(category) = LOWER(");
            query.push_bind(category.to_string());
            query.push(")");
        }

        if let Some(search) = filter.search() {
            let pattern = format!("%{}%", escape_like(search));
            query.push(" AND (title ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR category ILIKE ");
            query.push_bind(pattern);
            query.push(")");
        }

        query.push(" ORDER BY code ASC");

        let questions = query
            .build_query_as::<Question>()
            .fetch_all(self.pool)
            .await?;

        Ok(questions)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Question> {
        sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE question_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Create a new question
    pub async fn create(&self, req: &CreateQuestionRequest) -> Result<Question> {
        let link = req.link.as_deref().unwrap_or(DEFAULT_QUESTION_LINK);

        sqlx::query_as::<_, Question>(&format!(
            r#"
            INSERT INTO questions (code, title, difficulty, category, description, snippet, link)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {QUESTION_COLUMNS}
            "#
        ))
        .bind(req.code.trim())
        .bind(&req.title)
        .bind(req.difficulty)
        .bind(&req.category)
        .bind(&req.description)
        .bind(&req.snippet)
        .bind(link)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).on_unique_violation("Question code already exists"))
    }

    /// Update an existing question
    pub async fn update(&self, existing: &Question, req: &UpdateQuestionRequest) -> Result<Question> {
        let code = req
            .code
            .as_deref()
            .map(str::trim)
            .unwrap_or(existing.code.as_str());
        let title = req.title.as_ref().unwrap_or(&existing.title);
        let difficulty = req.difficulty.unwrap_or(existing.difficulty);
        let category = req.category.as_ref().unwrap_or(&existing.category);
        let description = req.description.as_ref().unwrap_or(&existing.description);
        let snippet = req.snippet.as_ref().unwrap_or(&existing.snippet);
        let link = req.link.as_ref().unwrap_or(&existing.link);

        sqlx::query_as::<_, Question>(&format!(
            r#"
            UPDATE questions
            SET code = $2,
                title = $3,
                difficulty = $4,
                category = $5,
                description = $6,
                snippet = $7,
                link = $8,
                updated_at = NOW()
            WHERE question_id = $1
            RETURNING {QUESTION_COLUMNS}
            "#
        ))
        .bind(existing.question_id)
        .bind(code)
        .bind(title)
        .bind(difficulty)
        .bind(category)
        .bind(description)
        .bind(snippet)
        .bind(link)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| StorageError::from(e).on_unique_violation("Question code already exists"))?
        .ok_or(StorageError::NotFound)
    }

    /// Delete a question by ID
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM questions WHERE question_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

/// Escapes `%`, `_` and `\` so user input matches literally inside a LIKE pattern.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
