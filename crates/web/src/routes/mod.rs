use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::ApiDoc;
use crate::features::{admin, auth, challenges, health, leaderboard, questions};
use crate::state::AppState;

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .merge(health::routes())
        .merge(challenges::routes::routes())
        .merge(questions::routes::routes())
        .merge(leaderboard::routes::routes())
        .merge(auth::routes::routes(state.jwt.clone()))
        .nest("/admin", admin::routes::routes(state.jwt.clone()));

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
