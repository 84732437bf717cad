//! Blog routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use lenaclav_db::{NewBlog, UpdateBlog};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{BlogResponse, CreateBlogRequest, ListQuery, UpdateBlogRequest};

fn validate_blog_fields(title: Option<&str>, body: Option<&str>) -> Result<(), ApiError> {
    if let Some(title) = title
        && title.trim().is_empty()
    {
        return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
    }
    if let Some(body) = body
        && body.trim().is_empty()
    {
        return Err(ApiError::BadRequest("Body cannot be empty".to_string()));
    }
    Ok(())
}

// ==================== Blog Routes ====================

/// GET /blogs
async fn list_blogs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<BlogResponse>>, ApiError> {
    let blogs = state.db.list_blogs(query.limit, query.offset).await?;
    Ok(Json(blogs.into_iter().map(BlogResponse::from).collect()))
}

/// GET /blogs/:id
async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogResponse>, ApiError> {
    let blog = state
        .db
        .get_blog(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Blog: {}", id)))?;

    Ok(Json(blog.into()))
}

/// POST /blogs
async fn create_blog(
    State(state): State<AppState>,
    Json(request): Json<CreateBlogRequest>,
) -> Result<(StatusCode, Json<BlogResponse>), ApiError> {
    validate_blog_fields(Some(&request.title), Some(&request.body))?;

    let blog = state
        .db
        .insert_blog(NewBlog {
            title: request.title,
            body: request.body,
            published_at: request.published_at,
        })
        .await?;

    info!("Created blog: {}", blog.id);

    Ok((StatusCode::CREATED, Json(blog.into())))
}

/// PATCH /blogs/:id
async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateBlogRequest>,
) -> Result<Json<BlogResponse>, ApiError> {
    validate_blog_fields(request.title.as_deref(), request.body.as_deref())?;

    let updated = state
        .db
        .update_blog(
            &id,
            UpdateBlog {
                title: request.title,
                body: request.body,
                published_at: request.published_at,
            },
        )
        .await?;

    if !updated {
        return Err(ApiError::NotFound(format!("Blog: {}", id)));
    }

    let blog = state
        .db
        .get_blog(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Blog: {}", id)))?;

    Ok(Json(blog.into()))
}

/// DELETE /blogs/:id
async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_blog(&id).await?;

    if deleted {
        info!("Deleted blog: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Blog: {}", id)))
    }
}

/// Create blog routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/blogs", get(list_blogs).post(create_blog))
        .route(
            "/blogs/{id}",
            get(get_blog).patch(update_blog).delete(delete_blog),
        )
}
