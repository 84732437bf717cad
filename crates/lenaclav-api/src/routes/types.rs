//! Request/Response DTOs
//!
//! Request and response bodies are camelCase, matching what the frontend
//! sends and expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Listing Types ====================

fn default_offset() -> i64 {
    0
}

fn default_limit() -> i64 {
    50
}

/// Common list query parameters
#[derive(Deserialize, Default)]
pub struct ListQuery {
    #[serde(default = "default_offset")]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// Count response
#[derive(Serialize)]
pub struct CountResponse {
    pub total: i64,
}

/// Generic acknowledgement
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================== Auth Types ====================

/// Login request; either field may carry the identity
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

/// Login response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    /// Millisecond Unix timestamp
    pub expires_at: i64,
}

/// Register request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

/// Signup confirmation request
#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub email: String,
    pub code: Option<String>,
}

/// Token refresh request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token refresh response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
    pub expires_at: i64,
}

/// Whoami request: decode a credential supplied in the body
#[derive(Deserialize)]
pub struct WhoamiRequest {
    pub token: String,
}

/// Whoami response
#[derive(Serialize)]
pub struct WhoamiResponse {
    pub decoded: lenaclav_auth::Claims,
}

/// Self-service account deletion request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountRequest {
    pub access_token: String,
}

/// Password reset initiation request
#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Password reset completion request
#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub password: String,
}

/// Admin signup confirmation request
#[derive(Deserialize)]
pub struct ConfirmUserRequest {
    pub username: String,
}

/// Directory listing query parameters
#[derive(Deserialize, Default)]
pub struct DirectoryQuery {
    #[serde(default = "default_directory_limit")]
    pub limit: i64,
    pub cursor: Option<String>,
}

fn default_directory_limit() -> i64 {
    10
}

/// One directory entry
#[derive(Serialize)]
pub struct DirectoryUserResponse {
    pub user: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Directory listing response
#[derive(Serialize)]
pub struct DirectoryListResponse {
    pub users: Vec<DirectoryUserResponse>,
    pub cursor: Option<String>,
}

// ==================== User Types ====================

/// Create user request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
}

/// Update user request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub roles_version: Option<i64>,
}

/// User response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub roles_version: i64,
    pub created_at: String,
}

impl From<lenaclav_db::User> for UserResponse {
    fn from(user: lenaclav_db::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            roles_version: user.roles_version,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

// ==================== Post Types ====================

/// Create post request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
    pub created_by: Option<String>,
}

/// Update post request
#[derive(Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Post response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub body: String,
    pub created_by: String,
    pub created_at: String,
}

impl From<lenaclav_db::Post> for PostResponse {
    fn from(post: lenaclav_db::Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            body: post.body,
            created_by: post.created_by,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

// ==================== Blog Types ====================

/// Create blog request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogRequest {
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Update blog request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Blog response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogResponse {
    pub id: String,
    pub title: String,
    pub body: String,
    pub published_at: String,
}

impl From<lenaclav_db::Blog> for BlogResponse {
    fn from(blog: lenaclav_db::Blog) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            body: blog.body,
            published_at: blog.published_at.to_rfc3339(),
        }
    }
}

// ==================== Event Types ====================

/// Create event request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

/// Update event request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

/// Event response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    pub created_at: String,
}

impl From<lenaclav_db::Event> for EventResponse {
    fn from(event: lenaclav_db::Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            location: event.location,
            start_at: event.start_at.to_rfc3339(),
            end_at: event.end_at.map(|dt| dt.to_rfc3339()),
            created_at: event.created_at.to_rfc3339(),
        }
    }
}
