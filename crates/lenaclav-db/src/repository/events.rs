//! Event operations

use chrono::Utc;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{Event, NewEvent, UpdateEvent};
use crate::repository::Database;

impl Database {
    // ==================== Event Operations ====================

    /// Insert a new event
    pub async fn insert_event(&self, event: NewEvent) -> Result<Event, DbError> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let start_at = event.start_at.unwrap_or(now);

        sqlx::query(
            r#"
            INSERT INTO events (id, title, description, location, start_at, end_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(start_at.to_rfc3339())
        .bind(event.end_at.map(|dt| dt.to_rfc3339()))
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Event {
            id,
            title: event.title,
            description: event.description,
            location: event.location,
            start_at,
            end_at: event.end_at,
            created_at: now,
        })
    }

    /// Get an event by ID
    pub async fn get_event(&self, id: &str) -> Result<Option<Event>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, title, description, location, start_at, end_at, created_at
            FROM events
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Event::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List events by start time, soonest first
    pub async fn list_events(&self, limit: i64, offset: i64) -> Result<Vec<Event>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, location, start_at, end_at, created_at
            FROM events
            ORDER BY start_at ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Event::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Apply a partial update to an event
    pub async fn update_event(&self, id: &str, update: UpdateEvent) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                location = COALESCE(?, location),
                start_at = COALESCE(?, start_at),
                end_at = COALESCE(?, end_at)
            WHERE id = ?
            "#,
        )
        .bind(update.title)
        .bind(update.description)
        .bind(update.location)
        .bind(update.start_at.map(|dt| dt.to_rfc3339()))
        .bind(update.end_at.map(|dt| dt.to_rfc3339()))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an event
    pub async fn delete_event(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
