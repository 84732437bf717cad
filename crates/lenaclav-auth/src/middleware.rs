//! Session-gate middleware for Axum
//!
//! The gate runs in front of every route. Requests without a bearer
//! credential pass through anonymously; requests with one must verify and
//! must not be stale, and carry the merged principal in their extensions
//! afterwards.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use lenaclav_db::{Database, User};

use crate::error::AuthError;
use crate::verifier::{Claims, TokenVerifier};

/// Authenticated identity attached to a request
///
/// A merge of the verified claims and the stored user record; constructed
/// per request and discarded with it.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub email: Option<String>,
    pub roles_version: i64,
    /// Full verified claims for downstream handlers
    pub claims: Claims,
}

impl Principal {
    /// Synthesize a principal from claims alone (no stored record)
    pub fn from_claims(claims: Claims) -> Option<Self> {
        let username = claims.username()?.to_string();
        let user_id = claims.sub().unwrap_or(&username).to_string();
        let email = claims.email().map(str::to_string);
        Some(Self {
            user_id,
            username,
            email,
            roles_version: 0,
            claims,
        })
    }

    /// Merge verified claims with the stored user record
    pub fn merge(claims: Claims, user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            email: Some(user.email),
            roles_version: user.roles_version,
            claims,
        }
    }
}

/// Session gate state
///
/// `bypass` disables the gate entirely; it is fixed at construction along
/// with the verifier, never read from ambient process state.
#[derive(Clone)]
pub struct SessionGate {
    bypass: bool,
    verifier: Arc<TokenVerifier>,
    db: Database,
}

impl SessionGate {
    pub fn new(bypass: bool, verifier: Arc<TokenVerifier>, db: Database) -> Self {
        Self {
            bypass,
            verifier,
            db,
        }
    }

    /// Verify a credential, load the matching user, and enforce the
    /// roles-version check
    async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.verifier.verify(token).await?;
        let username = claims.username().ok_or(AuthError::InvalidPayload)?;

        let user = self.db.get_user_by_username(username).await?;

        // A token minted before the last permission change carries a lower
        // roles-version than the stored record and is no longer honored,
        // even though its signature is still valid.
        if let Some(token_version) = claims.roles_version() {
            let stored = user.as_ref().map(|u| u.roles_version).unwrap_or(0);
            if token_version < stored {
                return Err(AuthError::SessionExpired);
            }
        }

        match user {
            Some(user) => Ok(Principal::merge(claims, user)),
            None => Principal::from_claims(claims).ok_or(AuthError::InvalidPayload),
        }
    }
}

/// Session gate middleware
///
/// On success the merged principal is added to request extensions; on
/// failure the request is rejected with 401 before any handler runs.
pub async fn session_middleware(
    State(gate): State<SessionGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if gate.bypass {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    // Absent or non-bearer credentials mean an anonymous request
    let Some(token) = auth_header.and_then(|h| h.strip_prefix("Bearer ")) else {
        return Ok(next.run(request).await);
    };

    match gate.authenticate(token).await {
        Ok(principal) => {
            debug!("Authenticated user: {}", principal.username);
            request.extensions_mut().insert(principal);
            Ok(next.run(request).await)
        }
        Err(err) => {
            warn!(error = %err, "bearer credential rejected");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Json, Router, body::Body, middleware, routing::get};
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use http::{Request as HttpRequest, StatusCode, header};
    use lenaclav_db::{NewUser, UpdateUser};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn whoami(principal: Option<Extension<Principal>>) -> Json<Value> {
        match principal {
            Some(Extension(p)) => Json(json!({
                "username": p.username,
                "userId": p.user_id,
                "rolesVersion": p.roles_version,
            })),
            None => Json(json!({ "anonymous": true })),
        }
    }

    async fn gated_app(bypass: bool) -> (Router, Database) {
        let db = Database::in_memory().await.unwrap();
        let gate = SessionGate::new(bypass, Arc::new(TokenVerifier::new(true)), db.clone());
        let app = Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(gate, session_middleware));
        (app, db)
    }

    fn bearer(claims: Value) -> String {
        format!("Bearer {}", BASE64.encode(claims.to_string()))
    }

    async fn send(app: Router, authorization: Option<String>) -> (StatusCode, Value) {
        let mut request = HttpRequest::builder().uri("/whoami");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_anonymous_request_passes_through() {
        let (app, _db) = gated_app(false).await;

        let (status, body) = send(app, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "anonymous": true }));
    }

    #[tokio::test]
    async fn test_bypass_attaches_no_principal() {
        let (app, _db) = gated_app(true).await;

        let (status, body) = send(
            app,
            Some(bearer(json!({ "username": "u1", "sub": "u1" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "anonymous": true }));
    }

    #[tokio::test]
    async fn test_self_signed_credential_attaches_principal() {
        let (app, _db) = gated_app(false).await;

        let (status, body) = send(
            app,
            Some(bearer(json!({ "username": "u1", "sub": "u1" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "u1");
        assert_eq!(body["userId"], "u1");
    }

    #[tokio::test]
    async fn test_invalid_credential_rejected() {
        let (app, _db) = gated_app(false).await;

        let (status, body) = send(app, Some("Bearer !!garbage!!".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Invalid credential" }));
    }

    #[tokio::test]
    async fn test_claims_without_username_rejected() {
        let (app, _db) = gated_app(false).await;

        let (status, body) = send(app, Some(bearer(json!({ "sub": "u1" })))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Invalid token payload" }));
    }

    async fn seed_user(db: &Database, username: &str, roles_version: i64) {
        let user = db
            .insert_user(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
            })
            .await
            .unwrap();
        db.update_user(
            &user.id,
            UpdateUser {
                roles_version: Some(roles_version),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_stale_roles_version_rejected() {
        let (app, db) = gated_app(false).await;
        seed_user(&db, "u1", 2).await;

        let (status, body) = send(
            app,
            Some(bearer(
                json!({ "username": "u1", "sub": "u1", "roles_version": "1" }),
            )),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Session expired" }));
    }

    #[tokio::test]
    async fn test_missing_roles_version_accepted_regardless() {
        let (app, db) = gated_app(false).await;
        seed_user(&db, "u1", 5).await;

        let (status, body) = send(
            app,
            Some(bearer(json!({ "username": "u1", "sub": "u1" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "u1");
        assert_eq!(body["rolesVersion"], 5);
    }

    #[tokio::test]
    async fn test_current_roles_version_accepted() {
        let (app, db) = gated_app(false).await;
        seed_user(&db, "u1", 2).await;

        let (status, body) = send(
            app,
            Some(bearer(
                json!({ "username": "u1", "sub": "u1", "roles_version": "2" }),
            )),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rolesVersion"], 2);
    }

    #[tokio::test]
    async fn test_unknown_user_gets_synthesized_principal() {
        let (app, _db) = gated_app(false).await;

        let (status, body) = send(
            app,
            Some(bearer(
                json!({ "username": "nobody", "sub": "sub-1", "roles_version": "4" }),
            )),
        )
        .await;
        // No stored record: the version check compares against 0
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "nobody");
        assert_eq!(body["userId"], "sub-1");
        assert_eq!(body["rolesVersion"], 0);
    }
}
