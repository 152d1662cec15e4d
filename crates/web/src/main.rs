use anyhow::Context;
use storage::Database;
use utoipa::OpenApi;

mod config;
mod error;
mod features;
mod middleware;
mod routes;
mod state;

use config::Config;
use middleware::{auth::JwtKeys, cors::cors_layer};
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::health::health,
        features::challenges::handlers::get_today_challenge,
        features::challenges::handlers::create_challenge,
        features::challenges::handlers::update_challenge,
        features::challenges::handlers::delete_challenge,
        features::questions::handlers::list_questions,
        features::questions::handlers::create_question,
        features::questions::handlers::update_question,
        features::questions::handlers::delete_question,
        features::leaderboard::handlers::list_leaderboard,
        features::leaderboard::handlers::create_entry,
        features::leaderboard::handlers::update_entry,
        features::leaderboard::handlers::delete_entry,
        features::auth::handlers::login,
        features::auth::handlers::me,
        features::admin::handlers::get_overview,
    ),
    components(
        schemas(
            storage::dto::common::HealthResponse,
            storage::dto::challenge::CreateChallengeRequest,
            storage::dto::challenge::UpdateChallengeRequest,
            storage::dto::question::CreateQuestionRequest,
            storage::dto::question::UpdateQuestionRequest,
            storage::dto::leaderboard::CreateLeaderboardEntryRequest,
            storage::dto::leaderboard::UpdateLeaderboardEntryRequest,
            storage::dto::auth::LoginRequest,
            storage::dto::auth::LoginResponse,
            storage::dto::auth::AdminUserInfo,
            storage::dto::auth::CurrentAdminResponse,
            storage::dto::admin::AdminOverviewResponse,
            storage::models::Challenge,
            storage::models::Difficulty,
            storage::models::Question,
            storage::models::LeaderboardEntry,
            storage::models::LeaderboardType,
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "challenges", description = "Public challenge endpoints"),
        (name = "questions", description = "Public question bank"),
        (name = "leaderboard", description = "Public leaderboard endpoints"),
        (name = "auth", description = "Admin login"),
        (name = "admin", description = "Content and leaderboard management"),
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting leaderboard API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    features::auth::services::ensure_admin(
        db.pool(),
        config.admin_username.as_deref(),
        config.admin_password.as_deref(),
    )
    .await?;

    if config.cors_origins.is_empty() {
        tracing::warn!("No CORS origins configured, allowing any origin");
    }

    let state = AppState {
        db,
        jwt: JwtKeys::new(&config.jwt_secret, config.jwt_expires_in_hours),
    };
    let app = routes::router(state, cors_layer(&config.cors_origins));

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app).await?;

    Ok(())
}
