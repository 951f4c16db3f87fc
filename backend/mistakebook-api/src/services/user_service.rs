use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::user::{CreateUserRequest, User};

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";

pub struct UserService {
    db: SqlitePool,
}

impl UserService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Return the user with this email, creating it on first sight.
    pub async fn find_or_create(&self, req: CreateUserRequest) -> AppResult<User> {
        req.validate()?;
        let email = req.email.unwrap_or_default();

        if let Some(existing) = self.find_by_email(&email).await? {
            tracing::debug!("User {} already exists", existing.id);
            return Ok(existing);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            email,
            created_at: now,
            updated_at: now,
        };

        let inserted = sqlx::query(
            "INSERT INTO users (id, name, email, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.db)
        .await;

        match inserted {
            Ok(_) => {
                tracing::info!("Created user {} ({})", user.id, user.email);
                Ok(user)
            }
            // Two concurrent first visits: the other request won, return its row.
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => self
                .find_by_email(&user.email)
                .await?
                .ok_or_else(|| AppError::not_found("User not found")),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<User> {
        self.find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    pub async fn ensure_exists(&self, id: &str) -> AppResult<()> {
        match self.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("User not found")),
        }
    }
}
