use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub struct AppState {
    pub config: Config,
    pub db: SqlitePool,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        tracing::info!("Opening database {}", config.database_url);
        let db = db::init_pool(&config).await?;

        default_user_seed::bootstrap(&config, &db).await?;

        let open_sessions = review_service::ReviewService::new(db.clone())
            .sync_active_sessions()
            .await?;
        tracing::debug!("{} review sessions still open", open_sessions);

        Ok(Self { config, db })
    }
}

pub mod default_user_seed;
pub mod filter;
pub mod mistake_service;
pub mod review_service;
pub mod stats_service;
pub mod tag_service;
pub mod user_service;
