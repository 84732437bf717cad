//! Post operations

use chrono::Utc;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NewPost, Post, UpdatePost};
use crate::repository::Database;

impl Database {
    // ==================== Post Operations ====================

    /// Insert a new post
    pub async fn insert_post(&self, post: NewPost) -> Result<Post, DbError> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO posts (id, title, body, created_by, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(&post.created_by)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Post {
            id,
            title: post.title,
            body: post.body,
            created_by: post.created_by,
            created_at: now,
        })
    }

    /// Get a post by ID
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, title, body, created_by, created_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Post::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List posts, newest first
    pub async fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, body, created_by, created_at
            FROM posts
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Post::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Apply a partial update to a post
    pub async fn update_post(&self, id: &str, update: UpdatePost) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = COALESCE(?, title),
                body = COALESCE(?, body)
            WHERE id = ?
            "#,
        )
        .bind(update.title)
        .bind(update.body)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a post
    pub async fn delete_post(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_post_crud() {
        let db = test_db().await;

        let post = db
            .insert_post(NewPost {
                title: "First".to_string(),
                body: "Hello".to_string(),
                created_by: "system".to_string(),
            })
            .await
            .unwrap();

        let found = db.get_post(&post.id).await.unwrap().unwrap();
        assert_eq!(found.title, "First");
        assert_eq!(found.created_by, "system");

        let updated = db
            .update_post(
                &post.id,
                UpdatePost {
                    body: Some("Edited".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated);

        let found = db.get_post(&post.id).await.unwrap().unwrap();
        assert_eq!(found.title, "First");
        assert_eq!(found.body, "Edited");

        assert!(db.delete_post(&post.id).await.unwrap());
        assert!(db.get_post(&post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_listing_pagination() {
        let db = test_db().await;

        for i in 0..3 {
            db.insert_post(NewPost {
                title: format!("post-{}", i),
                body: "body".to_string(),
                created_by: "system".to_string(),
            })
            .await
            .unwrap();
        }

        let all = db.list_posts(50, 0).await.unwrap();
        assert_eq!(all.len(), 3);

        let page = db.list_posts(2, 2).await.unwrap();
        assert_eq!(page.len(), 1);
    }
}
