//! API routes

mod auth;
mod blogs;
mod events;
mod health;
pub mod metrics;
mod posts;
mod types;
mod users;

use axum::{Router, middleware};
use std::sync::Arc;

use lenaclav_auth::{SessionGate, session_middleware};

use crate::state::{AppState, MetricsHandle};

/// Create the main router
///
/// The session gate fronts every application route; the metrics endpoint
/// is mounted outside it.
pub fn create_router(
    state: AppState,
    gate: SessionGate,
    metrics_handle: Option<Arc<MetricsHandle>>,
) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(posts::routes())
        .merge(blogs::routes())
        .merge(events::routes())
        .merge(users::routes())
        .merge(auth::routes())
        .layer(middleware::from_fn_with_state(gate, session_middleware))
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use http::{Method, Request, StatusCode, header};
    use lenaclav_auth::{LocalProvider, TokenVerifier};
    use lenaclav_db::Database;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_app() -> (Router, Database) {
        let db = Database::in_memory().await.unwrap();
        let verifier = Arc::new(TokenVerifier::new(true));
        let state = AppState::new(db.clone(), verifier.clone(), Arc::new(LocalProvider::new()));
        let gate = SessionGate::new(false, verifier, db.clone());
        (create_router(state, gate, None), db)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(value) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn self_signed(claims: Value) -> String {
        BASE64.encode(claims.to_string())
    }

    #[tokio::test]
    async fn test_welcome_and_health() {
        let (app, _db) = test_app().await;

        let (status, body) = send(&app, Method::GET, "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Welcome to the lenaclav.com API");

        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_post_crud_round_trip() {
        let (app, _db) = test_app().await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/posts",
            None,
            Some(json!({ "title": "First", "body": "Hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["createdBy"], "system");

        let id = created["id"].as_str().unwrap().to_string();

        let (status, fetched) =
            send(&app, Method::GET, &format!("/posts/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["title"], "First");

        let (status, updated) = send(
            &app,
            Method::PATCH,
            &format!("/posts/{}", id),
            None,
            Some(json!({ "body": "Edited" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["body"], "Edited");
        assert_eq!(updated["title"], "First");

        let (status, _) = send(&app, Method::DELETE, &format!("/posts/{}", id), None, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, &format!("/posts/{}", id), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_author_comes_from_principal() {
        let (app, _db) = test_app().await;
        let token = self_signed(json!({ "username": "author", "sub": "author" }));

        let (status, created) = send(
            &app,
            Method::POST,
            "/posts",
            Some(&token),
            Some(json!({ "title": "Mine", "body": "Signed" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["createdBy"], "author");
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let (app, _db) = test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/posts",
            None,
            Some(json!({ "title": "  ", "body": "Hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Title cannot be empty");
    }

    #[tokio::test]
    async fn test_login_issues_token_and_upserts_record() {
        let (app, db) = test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "u1", "password": "whatever" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["refreshToken"], "test-refresh");

        // The login created a local user record
        assert!(db.get_user_by_username("u1").await.unwrap().is_some());

        // The issued token decodes through whoami
        let token = body["token"].as_str().unwrap();
        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/whoami",
            None,
            Some(json!({ "token": token })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decoded"]["username"], "u1");
    }

    #[tokio::test]
    async fn test_stale_token_rejected_end_to_end() {
        let (app, db) = test_app().await;

        // Login to create the record, then bump its roles-version
        send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "u1", "password": "pw" })),
        )
        .await;
        let user = db.get_user_by_username("u1").await.unwrap().unwrap();
        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("/users/{}", user.id),
            None,
            Some(json!({ "rolesVersion": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // A token minted before the bump is no longer honored
        let stale = self_signed(json!({ "username": "u1", "sub": "u1", "roles_version": "1" }));
        let (status, body) = send(&app, Method::GET, "/posts", Some(&stale), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Session expired");

        // A token carrying the current version still is
        let current = self_signed(json!({ "username": "u1", "sub": "u1", "roles_version": "2" }));
        let (status, _) = send(&app, Method::GET, "/posts", Some(&current), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_duplicate_user_conflict() {
        let (app, _db) = test_app().await;

        let payload = json!({ "username": "dup", "email": "dup@example.com" });
        let (status, _) = send(&app, Method::POST, "/users", None, Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(&app, Method::POST, "/users", None, Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_user_count_tracks_registrations() {
        let (app, _db) = test_app().await;

        let (_, body) = send(&app, Method::GET, "/users/_count", None, None).await;
        assert_eq!(body["total"], 0);

        send(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "new@example.com", "password": "pw" })),
        )
        .await;

        let (_, body) = send(&app, Method::GET, "/users/_count", None, None).await;
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_directory_listing_empty_for_local_provider() {
        let (app, _db) = test_app().await;

        let (status, body) = send(&app, Method::GET, "/auth/users", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"], json!([]));
    }

    #[tokio::test]
    async fn test_event_listing_roundtrip() {
        let (app, _db) = test_app().await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/events",
            None,
            Some(json!({
                "title": "Opening",
                "description": "Doors at seven",
                "location": "Main hall",
                "startAt": "2025-01-10T19:00:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["startAt"], "2025-01-10T19:00:00+00:00");

        let (status, listed) = send(&app, Method::GET, "/events", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["location"], "Main hall");
    }
}
