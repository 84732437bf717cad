//! Event routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use lenaclav_db::{NewEvent, UpdateEvent};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{CreateEventRequest, EventResponse, ListQuery, UpdateEventRequest};

fn validate_event_fields(title: Option<&str>, description: Option<&str>) -> Result<(), ApiError> {
    if let Some(title) = title
        && title.trim().is_empty()
    {
        return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
    }
    if let Some(description) = description
        && description.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "Description cannot be empty".to_string(),
        ));
    }
    Ok(())
}

// ==================== Event Routes ====================

/// GET /events
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let events = state.db.list_events(query.limit, query.offset).await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

/// GET /events/:id
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state
        .db
        .get_event(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event: {}", id)))?;

    Ok(Json(event.into()))
}

/// POST /events
async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    validate_event_fields(Some(&request.title), Some(&request.description))?;

    let event = state
        .db
        .insert_event(NewEvent {
            title: request.title,
            description: request.description,
            location: request.location,
            start_at: request.start_at,
            end_at: request.end_at,
        })
        .await?;

    info!("Created event: {}", event.id);

    Ok((StatusCode::CREATED, Json(event.into())))
}

/// PATCH /events/:id
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    validate_event_fields(request.title.as_deref(), request.description.as_deref())?;

    let updated = state
        .db
        .update_event(
            &id,
            UpdateEvent {
                title: request.title,
                description: request.description,
                location: request.location,
                start_at: request.start_at,
                end_at: request.end_at,
            },
        )
        .await?;

    if !updated {
        return Err(ApiError::NotFound(format!("Event: {}", id)));
    }

    let event = state
        .db
        .get_event(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event: {}", id)))?;

    Ok(Json(event.into()))
}

/// DELETE /events/:id
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_event(&id).await?;

    if deleted {
        info!("Deleted event: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Event: {}", id)))
    }
}

/// Create event routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
}
