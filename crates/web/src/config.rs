use anyhow::{Context, Result, bail};

const DEFAULT_JWT_EXPIRES_IN_HOURS: i64 = 24 * 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in_hours: i64,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET is required")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let jwt_expires_in_hours = match std::env::var("JWT_EXPIRES_IN_HOURS") {
            Ok(value) => value
                .parse()
                .context("JWT_EXPIRES_IN_HOURS must be a number")?,
            Err(_) => DEFAULT_JWT_EXPIRES_IN_HOURS,
        };

        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            jwt_secret,
            jwt_expires_in_hours,
            admin_username: non_empty_var("ADMIN_USERNAME"),
            admin_password: non_empty_var("ADMIN_PASSWORD"),
            cors_origins: collect_origins(
                non_empty_var("CLIENT_ORIGIN"),
                non_empty_var("ADMIN_ORIGIN"),
                &std::env::var("CORS_ORIGINS").unwrap_or_default(),
            ),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Client and admin origins first, then the comma-separated extras. Duplicates dropped.
fn collect_origins(client: Option<String>, admin: Option<String>, extra: &str) -> Vec<String> {
    let mut origins: Vec<String> = Vec::new();

    let candidates = client
        .into_iter()
        .chain(admin)
        .chain(extra.split(',').map(|s| s.trim().to_string()));

    for origin in candidates {
        if !origin.is_empty() && !origins.contains(&origin) {
            origins.push(origin);
        }
    }

    origins
}
