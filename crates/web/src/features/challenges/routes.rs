use axum::{
    Router,
    routing::{get, post, put},
};

use super::handlers::{create_challenge, delete_challenge, get_today_challenge, update_challenge};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/today-challenge", get(get_today_challenge))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/challenges", post(create_challenge))
        .route("/challenges/:id", put(update_challenge).delete(delete_challenge))
}
