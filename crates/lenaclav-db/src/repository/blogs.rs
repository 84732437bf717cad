//! Blog operations

use chrono::Utc;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{Blog, NewBlog, UpdateBlog};
use crate::repository::Database;

impl Database {
    // ==================== Blog Operations ====================

    /// Insert a new blog entry
    pub async fn insert_blog(&self, blog: NewBlog) -> Result<Blog, DbError> {
        let id = Uuid::new_v4().to_string();
        let published_at = blog.published_at.unwrap_or_else(Utc::now);

        sqlx::query(
            r#"
            INSERT INTO blogs (id, title, body, published_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&blog.title)
        .bind(&blog.body)
        .bind(published_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Blog {
            id,
            title: blog.title,
            body: blog.body,
            published_at,
        })
    }

    /// Get a blog entry by ID
    pub async fn get_blog(&self, id: &str) -> Result<Option<Blog>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, title, body, published_at
            FROM blogs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Blog::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List blog entries, newest first
    pub async fn list_blogs(&self, limit: i64, offset: i64) -> Result<Vec<Blog>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, body, published_at
            FROM blogs
            ORDER BY published_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Blog::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Apply a partial update to a blog entry
    pub async fn update_blog(&self, id: &str, update: UpdateBlog) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE blogs
            SET title = COALESCE(?, title),
                body = COALESCE(?, body),
                published_at = COALESCE(?, published_at)
            WHERE id = ?
            "#,
        )
        .bind(update.title)
        .bind(update.body)
        .bind(update.published_at.map(|dt| dt.to_rfc3339()))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a blog entry
    pub async fn delete_blog(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_blog_crud() {
        let db = Database::in_memory().await.unwrap();

        let published = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let blog = db
            .insert_blog(NewBlog {
                title: "Launch".to_string(),
                body: "# Hello".to_string(),
                published_at: Some(published),
            })
            .await
            .unwrap();

        let found = db.get_blog(&blog.id).await.unwrap().unwrap();
        assert_eq!(found.published_at, published);

        assert!(
            db.update_blog(
                &blog.id,
                UpdateBlog {
                    title: Some("Launched".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
        );

        let found = db.get_blog(&blog.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Launched");
        assert_eq!(found.body, "# Hello");

        assert!(db.delete_blog(&blog.id).await.unwrap());
        assert!(db.list_blogs(50, 0).await.unwrap().is_empty());
    }
}
