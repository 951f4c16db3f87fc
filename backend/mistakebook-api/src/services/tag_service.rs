use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{conflict_on_unique, AppError, AppResult};
use crate::models::tag::{CreateTagRequest, Tag, UpdateTagRequest};
use crate::services::user_service::UserService;

const TAG_COLUMNS: &str = "id, name, user_id, created_at, updated_at";

pub struct TagService {
    db: SqlitePool,
}

impl TagService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE user_id = ? ORDER BY name ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(tags)
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(&format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(tag)
    }

    /// Tag of `user_id` named `name`, ignoring `exclude_id`.
    async fn find_duplicate(
        &self,
        user_id: &str,
        name: &str,
        exclude_id: Option<&str>,
    ) -> AppResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE user_id = ? AND name = ? AND id != ?"
        ))
        .bind(user_id)
        .bind(name)
        .bind(exclude_id.unwrap_or_default())
        .fetch_optional(&self.db)
        .await?;

        Ok(tag)
    }

    pub async fn create(&self, req: CreateTagRequest) -> AppResult<Tag> {
        req.validate()?;
        let name = req.name.unwrap_or_default();
        let user_id = req.user_id.unwrap_or_default();

        UserService::new(self.db.clone())
            .ensure_exists(&user_id)
            .await?;

        if self.find_duplicate(&user_id, &name, None).await?.is_some() {
            return Err(AppError::conflict("Tag already exists"));
        }

        let now = Utc::now();
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            name,
            user_id,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO tags (id, name, user_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&tag.id)
        .bind(&tag.name)
        .bind(&tag.user_id)
        .bind(tag.created_at)
        .bind(tag.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| conflict_on_unique(e, "Tag already exists"))?;

        tracing::info!("Created tag {} '{}' for user {}", tag.id, tag.name, tag.user_id);
        Ok(tag)
    }

    /// Rename. Uniqueness is checked against the owner's other tags.
    pub async fn rename(&self, id: &str, req: UpdateTagRequest) -> AppResult<Tag> {
        req.validate()?;
        let name = req.name.unwrap_or_default();

        let mut tag = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Tag not found"))?;

        if self
            .find_duplicate(&tag.user_id, &name, Some(id))
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Tag name already exists"));
        }

        tag.name = name;
        tag.updated_at = Utc::now();

        sqlx::query("UPDATE tags SET name = ?, updated_at = ? WHERE id = ?")
            .bind(&tag.name)
            .bind(tag.updated_at)
            .bind(&tag.id)
            .execute(&self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "Tag name already exists"))?;

        Ok(tag)
    }

    /// Delete; join rows go with it via ON DELETE CASCADE.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Tag not found"));
        }

        tracing::info!("Deleted tag {}", id);
        Ok(())
    }
}
