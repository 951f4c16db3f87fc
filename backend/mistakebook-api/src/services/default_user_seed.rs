//! Development convenience: there is no authentication, so the UI works as a
//! single configured user that is provisioned at startup.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::models::user::{CreateUserRequest, User};
use crate::services::user_service::UserService;

pub async fn bootstrap(config: &Config, db: &SqlitePool) -> Result<Option<User>> {
    if !config.default_user.enabled {
        tracing::debug!("Default user provisioning disabled, skipping bootstrap");
        return Ok(None);
    }

    let request = CreateUserRequest {
        name: Some(config.default_user.name.clone()),
        email: Some(config.default_user.email.clone()),
    };

    let user = UserService::new(db.clone())
        .find_or_create(request)
        .await
        .context("Failed to provision default user")?;

    tracing::warn!(
        "Running as default user {} ({}); no authentication is configured",
        user.email,
        user.id
    );

    Ok(Some(user))
}
