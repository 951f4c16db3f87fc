use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::metrics::MISTAKES_CREATED_TOTAL;
use crate::models::mistake::{CreateMistakeRequest, Mistake, UpdateMistakeRequest};
use crate::models::tag::Tag;
use crate::services::user_service::UserService;

const MISTAKE_COLUMNS: &str = "id, content, correct_answer, explanation, error_reason, image_url, \
     mastery_level, user_id, created_at, updated_at, reviewed_at";

#[derive(sqlx::FromRow)]
struct MistakeTagRow {
    mistake_id: String,
    #[sqlx(flatten)]
    tag: Tag,
}

pub struct MistakeService {
    db: SqlitePool,
}

impl MistakeService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// All mistakes of a user, newest first, tags embedded.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Mistake>> {
        let mut mistakes = sqlx::query_as::<_, Mistake>(&format!(
            "SELECT {MISTAKE_COLUMNS} FROM mistakes WHERE user_id = ? \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, MistakeTagRow>(
            "SELECT mt.mistake_id, t.id, t.name, t.user_id, t.created_at, t.updated_at \
             FROM mistake_tags mt \
             JOIN tags t ON t.id = mt.tag_id \
             JOIN mistakes m ON m.id = mt.mistake_id \
             WHERE m.user_id = ? \
             ORDER BY t.name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let mut tags_by_mistake: HashMap<String, Vec<Tag>> = HashMap::new();
        for row in rows {
            tags_by_mistake
                .entry(row.mistake_id)
                .or_default()
                .push(row.tag);
        }

        for mistake in &mut mistakes {
            mistake.tags = tags_by_mistake.remove(&mistake.id).unwrap_or_default();
        }

        Ok(mistakes)
    }

    pub async fn get(&self, id: &str) -> AppResult<Mistake> {
        let mut conn = self.db.acquire().await?;
        load_mistake(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::not_found("Mistake not found"))
    }

    pub async fn create(&self, req: CreateMistakeRequest) -> AppResult<Mistake> {
        req.validate()?;
        let user_id = req.user_id.unwrap_or_default();

        UserService::new(self.db.clone())
            .ensure_exists(&user_id)
            .await?;

        let tag_ids = dedup_ids(req.tags.unwrap_or_default());
        self.ensure_tags_owned_by(&user_id, &tag_ids).await?;

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO mistakes (id, content, correct_answer, explanation, error_reason, \
             image_url, mastery_level, user_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?, ?)",
        )
        .bind(&id)
        .bind(req.content.unwrap_or_default())
        .bind(req.correct_answer.unwrap_or_default())
        .bind(non_empty(req.explanation))
        .bind(non_empty(req.error_reason))
        .bind(non_empty(req.image_url))
        .bind(&user_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        link_tags(&mut tx, &id, &tag_ids).await?;

        let created = load_mistake(&mut tx, &id)
            .await?
            .ok_or_else(|| AppError::not_found("Mistake not found"))?;

        tx.commit().await?;

        MISTAKES_CREATED_TOTAL.inc();
        tracing::info!(
            "Created mistake {} for user {} with {} tags",
            id,
            user_id,
            tag_ids.len()
        );

        Ok(created)
    }

    /// Partial update. `tags`, when present, replaces the whole link set.
    pub async fn update(&self, id: &str, req: UpdateMistakeRequest) -> AppResult<Mistake> {
        req.validate()?;

        let existing = self.get(id).await?;

        let tag_ids = req.tags.map(dedup_ids);
        if let Some(tag_ids) = &tag_ids {
            self.ensure_tags_owned_by(&existing.user_id, tag_ids).await?;
        }

        let content = req.content.unwrap_or(existing.content);
        let correct_answer = req.correct_answer.unwrap_or(existing.correct_answer);
        let explanation = merge_optional(existing.explanation, req.explanation);
        let error_reason = merge_optional(existing.error_reason, req.error_reason);
        let image_url = merge_optional(existing.image_url, req.image_url);
        let mastery_level = req.mastery_level.unwrap_or(existing.mastery_level);

        let mut tx = self.db.begin().await?;

        sqlx::query(
            "UPDATE mistakes SET content = ?, correct_answer = ?, explanation = ?, \
             error_reason = ?, image_url = ?, mastery_level = ?, updated_at = ? WHERE id = ?",
        )
        .bind(content)
        .bind(correct_answer)
        .bind(explanation)
        .bind(error_reason)
        .bind(image_url)
        .bind(mastery_level)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(tag_ids) = &tag_ids {
            sqlx::query("DELETE FROM mistake_tags WHERE mistake_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_tags(&mut tx, id, tag_ids).await?;
        }

        let updated = load_mistake(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Mistake not found"))?;

        tx.commit().await?;

        tracing::info!("Updated mistake {}", id);
        Ok(updated)
    }

    /// Delete; join rows and review entries cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM mistakes WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Mistake not found"));
        }

        tracing::info!("Deleted mistake {}", id);
        Ok(())
    }

    async fn ensure_tags_owned_by(&self, user_id: &str, tag_ids: &[String]) -> AppResult<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id FROM tags WHERE user_id = ");
        query.push_bind(user_id);
        query.push(" AND id IN (");
        let mut separated = query.separated(", ");
        for tag_id in tag_ids {
            separated.push_bind(tag_id);
        }
        separated.push_unseparated(")");

        let found: HashSet<String> = query
            .build_query_scalar::<String>()
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .collect();

        match tag_ids.iter().find(|id| !found.contains(*id)) {
            Some(missing) => Err(AppError::validation(format!("Unknown tag id: {}", missing))),
            None => Ok(()),
        }
    }
}

async fn load_mistake(conn: &mut SqliteConnection, id: &str) -> AppResult<Option<Mistake>> {
    let mistake = sqlx::query_as::<_, Mistake>(&format!(
        "SELECT {MISTAKE_COLUMNS} FROM mistakes WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(mut mistake) = mistake else {
        return Ok(None);
    };

    mistake.tags = sqlx::query_as::<_, Tag>(
        "SELECT t.id, t.name, t.user_id, t.created_at, t.updated_at \
         FROM mistake_tags mt JOIN tags t ON t.id = mt.tag_id \
         WHERE mt.mistake_id = ? ORDER BY t.name ASC",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(mistake))
}

async fn link_tags(conn: &mut SqliteConnection, mistake_id: &str, tag_ids: &[String]) -> AppResult<()> {
    for tag_id in tag_ids {
        sqlx::query("INSERT OR IGNORE INTO mistake_tags (mistake_id, tag_id) VALUES (?, ?)")
            .bind(mistake_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Keeps first occurrence order.
fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// `None` keeps the stored value, `Some("")` clears it.
fn merge_optional(existing: Option<String>, incoming: Option<String>) -> Option<String> {
    match incoming {
        None => existing,
        Some(value) if value.is_empty() => None,
        Some(value) => Some(value),
    }
}
