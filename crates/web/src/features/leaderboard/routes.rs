use axum::{
    Router,
    routing::{get, post, put},
};

use super::handlers::{create_entry, delete_entry, list_leaderboard, update_entry};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(list_leaderboard))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", post(create_entry))
        .route("/leaderboard/:id", put(update_entry).delete(delete_entry))
}
