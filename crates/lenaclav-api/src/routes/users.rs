//! User record routes
//!
//! These operate on the local user store only; pool-level account
//! operations live under `/auth`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use lenaclav_db::{NewUser, UpdateUser};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{CountResponse, CreateUserRequest, ListQuery, UpdateUserRequest, UserResponse};

/// Maximum allowed username length (usernames are often email addresses)
const MAX_USERNAME_LENGTH: usize = 128;

fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.trim().is_empty() {
        return Err(ApiError::BadRequest("Username cannot be empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    Ok(())
}

// ==================== User Routes ====================

/// GET /users
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.db.list_users(query.limit, query.offset).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/_count
async fn count_users(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let total = state.db.count_users().await?;
    Ok(Json(CountResponse { total }))
}

/// GET /users/:id
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .db
        .get_user_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    Ok(Json(user.into()))
}

/// POST /users
async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_username(&request.username)?;

    debug!("Creating user: {}", request.username);

    let user = state
        .db
        .insert_user(NewUser {
            username: request.username,
            email: request.email,
        })
        .await?;

    info!("Created user: {}", user.username);

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PATCH /users/:id
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state
        .db
        .update_user(
            &id,
            UpdateUser {
                email: request.email,
                roles_version: request.roles_version,
            },
        )
        .await?;

    if !updated {
        return Err(ApiError::NotFound(format!("User: {}", id)));
    }

    let user = state
        .db
        .get_user_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    info!("Updated user: {}", user.username);

    Ok(Json(user.into()))
}

/// DELETE /users/:id
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!("Deleting user: {}", id);

    let deleted = state.db.delete_user(&id).await?;

    if deleted {
        info!("Deleted user: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("User: {}", id)))
    }
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/_count", get(count_users))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}
