//! Post routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use lenaclav_auth::Principal;
use lenaclav_db::{NewPost, UpdatePost};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{CreatePostRequest, ListQuery, PostResponse, UpdatePostRequest};

/// Maximum allowed title length
const MAX_TITLE_LENGTH: usize = 200;

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Title exceeds maximum length of {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

fn validate_body(body: &str) -> Result<(), ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest("Body cannot be empty".to_string()));
    }
    Ok(())
}

// ==================== Post Routes ====================

/// GET /posts
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let posts = state.db.list_posts(query.limit, query.offset).await?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// GET /posts/:id
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state
        .db
        .get_post(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Post: {}", id)))?;

    Ok(Json(post.into()))
}

/// POST /posts
///
/// The author defaults to the session principal when one is attached.
async fn create_post(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    validate_title(&request.title)?;
    validate_body(&request.body)?;

    let created_by = principal
        .map(|Extension(p)| p.username)
        .or(request.created_by)
        .unwrap_or_else(|| "system".to_string());

    debug!("Creating post by {}", created_by);

    let post = state
        .db
        .insert_post(NewPost {
            title: request.title,
            body: request.body,
            created_by,
        })
        .await?;

    info!("Created post: {}", post.id);

    Ok((StatusCode::CREATED, Json(post.into())))
}

/// PATCH /posts/:id
async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    if let Some(title) = &request.title {
        validate_title(title)?;
    }
    if let Some(body) = &request.body {
        validate_body(body)?;
    }

    let updated = state
        .db
        .update_post(
            &id,
            UpdatePost {
                title: request.title,
                body: request.body,
            },
        )
        .await?;

    if !updated {
        return Err(ApiError::NotFound(format!("Post: {}", id)));
    }

    let post = state
        .db
        .get_post(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Post: {}", id)))?;

    Ok(Json(post.into()))
}

/// DELETE /posts/:id
async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_post(&id).await?;

    if deleted {
        info!("Deleted post: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Post: {}", id)))
    }
}

/// Create post routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
}
