//! Auth routes
//!
//! Account operations are delegated to the identity provider; the routes
//! here keep the local user store in step with it (registrations and
//! logins upsert a user record).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use lenaclav_db::NewUser;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{
    ConfirmRequest, ConfirmUserRequest, CountResponse, DeleteAccountRequest, DirectoryListResponse,
    DirectoryQuery, DirectoryUserResponse, ForgotPasswordRequest, LoginRequest, LoginResponse,
    MessageResponse, RefreshRequest, RefreshResponse, RegisterRequest, ResetPasswordRequest,
    WhoamiRequest, WhoamiResponse,
};

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

/// Create a user record for an identity if none exists yet; failures are
/// logged and swallowed so they never block the pool operation.
async fn ensure_user_record(state: &AppState, username: &str, email: &str) {
    match state.db.get_user_by_username(username).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            let new_user = NewUser {
                username: username.to_string(),
                email: email.to_string(),
            };
            if let Err(err) = state.db.insert_user(new_user).await {
                debug!(error = %err, "could not create user record for {}", username);
            }
        }
        Err(err) => {
            debug!(error = %err, "user lookup failed for {}", username);
        }
    }
}

// ==================== Auth Routes ====================

/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .identity
        .register(&request.email, request.phone.as_deref(), &request.password)
        .await?;

    ensure_user_record(&state, &request.email, &request.email).await;

    info!("Registered user: {}", request.email);
    Ok(message("User registered"))
}

/// POST /auth/confirm
async fn confirm(
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .identity
        .confirm(&request.email, request.code.as_deref())
        .await?;
    Ok(message("User confirmed"))
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let id = request
        .email
        .or(request.username)
        .ok_or_else(|| ApiError::BadRequest("email or username is required".to_string()))?;

    debug!("Login attempt for {}", id);

    let grant = state.identity.login(&id, &request.password).await?;

    ensure_user_record(&state, &id, &id).await;

    metrics::counter!("lenaclav_logins_total").increment(1);
    info!("User {} logged in", id);

    Ok(Json(LoginResponse {
        token: grant.token,
        refresh_token: grant.refresh_token,
        expires_at: grant.expires_at,
    }))
}

/// POST /auth/refresh
async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let grant = state.identity.refresh(&request.refresh_token).await?;

    Ok(Json(RefreshResponse {
        token: grant.token,
        expires_at: grant.expires_at,
    }))
}

/// POST /auth/whoami
///
/// Decode a credential supplied in the body (not the Authorization
/// header) and return its claims.
async fn whoami(
    State(state): State<AppState>,
    Json(request): Json<WhoamiRequest>,
) -> Result<Json<WhoamiResponse>, ApiError> {
    let decoded = state.verifier.verify(&request.token).await?;
    Ok(Json(WhoamiResponse { decoded }))
}

/// POST /auth/delete
async fn delete_account(
    State(state): State<AppState>,
    Json(request): Json<DeleteAccountRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.identity.delete_self(&request.access_token).await?;
    Ok(message("User deleted"))
}

/// POST /auth/forgot-password
async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.identity.forgot_password(&request.email).await?;
    Ok(message("Code sent"))
}

/// POST /auth/reset-password
async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .identity
        .reset_password(&request.email, &request.code, &request.password)
        .await?;
    Ok(message("Password reset"))
}

/// GET /auth/users
///
/// List pool accounts through the provider; each listed account is backed
/// by a local user record.
async fn list_directory(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<DirectoryListResponse>, ApiError> {
    let page = state
        .identity
        .list_users(query.limit, query.cursor.as_deref())
        .await?;

    for user in &page.users {
        ensure_user_record(&state, &user.username, &user.email).await;
    }

    Ok(Json(DirectoryListResponse {
        users: page
            .users
            .into_iter()
            .map(|u| DirectoryUserResponse {
                user: u.user,
                username: u.username,
                email: u.email,
                status: u.status,
            })
            .collect(),
        cursor: page.cursor,
    }))
}

/// GET /auth/users/_count
async fn count_directory(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let total = state.db.count_users().await?;
    Ok(Json(CountResponse { total }))
}

/// POST /auth/users/confirm
async fn confirm_user(
    State(state): State<AppState>,
    Json(request): Json<ConfirmUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.identity.confirm(&request.username, None).await?;
    Ok(message("User confirmed"))
}

/// DELETE /auth/users/:username
async fn admin_delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.identity.admin_delete_user(&username).await?;
    info!("Deleted pool account: {}", username);
    Ok(message("User deleted"))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/confirm", post(confirm))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/whoami", post(whoami))
        .route("/auth/delete", post(delete_account))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/users", get(list_directory))
        .route("/auth/users/_count", get(count_directory))
        .route("/auth/users/confirm", post(confirm_user))
        .route("/auth/users/{username}", delete(admin_delete_user))
}
