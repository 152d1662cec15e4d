use std::sync::Arc;

use sqlx::{PgPool, postgres::PgPoolOptions};

pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

use error::Result;
use services::leaderboard_ranking::RankLocks;

/// Shared handle to the connection pool and the per-partition rank locks.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    rank_locks: Arc<RankLocks>,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            rank_locks: Arc::new(RankLocks::default()),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn rank_locks(&self) -> &RankLocks {
        &self.rank_locks
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
