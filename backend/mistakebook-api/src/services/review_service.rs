use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::metrics::{REVIEW_ENTRIES_TOTAL, REVIEW_SESSIONS_ACTIVE, REVIEW_SESSIONS_TOTAL};
use crate::models::mistake::Mistake;
use crate::models::review::{CreateReviewEntryRequest, ReviewEntry, ReviewSession};
use crate::services::mistake_service::MistakeService;
use crate::store::review::review_order;

const SESSION_COLUMNS: &str = "id, start_time, end_time, mistakes_reviewed";
const ENTRY_COLUMNS: &str =
    "id, mistake_id, session_id, old_mastery_level, new_mastery_level, created_at";

pub struct ReviewService {
    db: SqlitePool,
}

impl ReviewService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create_session(&self) -> AppResult<ReviewSession> {
        let session = ReviewSession {
            id: Uuid::new_v4().to_string(),
            start_time: Utc::now(),
            end_time: None,
            mistakes_reviewed: 0,
            review_entries: Vec::new(),
        };

        sqlx::query(
            "INSERT INTO review_sessions (id, start_time, end_time, mistakes_reviewed) \
             VALUES (?, ?, NULL, 0)",
        )
        .bind(&session.id)
        .bind(session.start_time)
        .execute(&self.db)
        .await?;

        REVIEW_SESSIONS_TOTAL.inc();
        self.sync_active_sessions().await?;
        tracing::info!("Started review session {}", session.id);

        Ok(session)
    }

    /// All sessions newest first, entries embedded.
    pub async fn list_sessions(&self) -> AppResult<Vec<ReviewSession>> {
        let mut sessions = sqlx::query_as::<_, ReviewSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM review_sessions ORDER BY start_time DESC, rowid DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        let entries = sqlx::query_as::<_, ReviewEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM review_entries ORDER BY created_at ASC, rowid ASC"
        ))
        .fetch_all(&self.db)
        .await?;

        let mut by_session: HashMap<String, Vec<ReviewEntry>> = HashMap::new();
        for entry in entries {
            by_session
                .entry(entry.session_id.clone())
                .or_default()
                .push(entry);
        }

        for session in &mut sessions {
            session.review_entries = by_session.remove(&session.id).unwrap_or_default();
        }

        Ok(sessions)
    }

    pub async fn get_session(&self, id: &str) -> AppResult<ReviewSession> {
        let mut session = sqlx::query_as::<_, ReviewSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM review_sessions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Review session not found"))?;

        session.review_entries = sqlx::query_as::<_, ReviewEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM review_entries WHERE session_id = ? \
             ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(session)
    }

    /// Stamp `end_time`. Ending an already ended session moves the stamp.
    pub async fn end_session(&self, id: &str) -> AppResult<ReviewSession> {
        let existing = self.get_session(id).await?;

        sqlx::query("UPDATE review_sessions SET end_time = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.db)
            .await?;

        self.sync_active_sessions().await?;
        tracing::info!(
            "Ended review session {} after {} reviews",
            id,
            existing.mistakes_reviewed
        );

        self.get_session(id).await
    }

    /// Sets the active-sessions gauge from the table. Sessions left open by an
    /// earlier process are counted, so ending them cannot push it below zero.
    pub async fn sync_active_sessions(&self) -> AppResult<i64> {
        let open: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM review_sessions WHERE end_time IS NULL")
                .fetch_one(&self.db)
                .await?;

        REVIEW_SESSIONS_ACTIVE.set(open);
        Ok(open)
    }

    /// Record one rating. The entry insert, the mistake's mastery update and the
    /// session counter increment commit together or not at all.
    pub async fn record_entry(&self, req: CreateReviewEntryRequest) -> AppResult<ReviewEntry> {
        req.validate()?;

        let now = Utc::now();
        let entry = ReviewEntry {
            id: Uuid::new_v4().to_string(),
            mistake_id: req.mistake_id.unwrap_or_default(),
            session_id: req.session_id.unwrap_or_default(),
            old_mastery_level: req.old_mastery_level.unwrap_or_default(),
            new_mastery_level: req.new_mastery_level.unwrap_or_default(),
            created_at: now,
        };

        // Writes only: the first statement takes the write lock, so a concurrent
        // writer makes this wait on busy_timeout rather than fail a read-to-write
        // upgrade. Existence is read back from rows_affected.
        let mut tx = self.db.begin().await?;

        let mistake =
            sqlx::query("UPDATE mistakes SET mastery_level = ?, reviewed_at = ? WHERE id = ?")
                .bind(entry.new_mastery_level)
                .bind(now)
                .bind(&entry.mistake_id)
                .execute(&mut *tx)
                .await?;
        if mistake.rows_affected() == 0 {
            return Err(AppError::not_found("Mistake not found"));
        }

        let session = sqlx::query(
            "UPDATE review_sessions SET mistakes_reviewed = mistakes_reviewed + 1 WHERE id = ?",
        )
        .bind(&entry.session_id)
        .execute(&mut *tx)
        .await?;
        if session.rows_affected() == 0 {
            return Err(AppError::not_found("Review session not found"));
        }

        sqlx::query(&format!(
            "INSERT INTO review_entries ({ENTRY_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
        ))
        .bind(&entry.id)
        .bind(&entry.mistake_id)
        .bind(&entry.session_id)
        .bind(entry.old_mastery_level)
        .bind(entry.new_mastery_level)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        REVIEW_ENTRIES_TOTAL.inc();
        tracing::info!(
            "Recorded review of mistake {} in session {}: {} -> {}",
            entry.mistake_id,
            entry.session_id,
            entry.old_mastery_level,
            entry.new_mastery_level
        );

        Ok(entry)
    }

    /// The user's mistakes in the order a review run walks them.
    pub async fn review_queue(&self, user_id: &str) -> AppResult<Vec<Mistake>> {
        let mistakes = MistakeService::new(self.db.clone())
            .list_for_user(user_id)
            .await?;
        Ok(review_order(mistakes))
    }
}
