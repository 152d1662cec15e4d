use axum::{
    Router,
    routing::{get, post, put},
};

use super::handlers::{create_question, delete_question, list_questions, update_question};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/questions", get(list_questions))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/questions", post(create_question))
        .route("/questions/:id", put(update_question).delete(delete_question))
}
