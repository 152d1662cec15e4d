use axum::{Router, middleware, routing::get};

use super::handlers::get_overview;
use crate::features::{challenges, leaderboard, questions};
use crate::middleware::auth::{JwtKeys, require_auth};
use crate::state::AppState;

/// Everything under `/admin`, all behind a bearer token.
pub fn routes(keys: JwtKeys) -> Router<AppState> {
    Router::new()
        .route("/overview", get(get_overview))
        .merge(challenges::routes::admin_routes())
        .merge(questions::routes::admin_routes())
        .merge(leaderboard::routes::admin_routes())
        .route_layer(middleware::from_fn_with_state(keys, require_auth))
}
