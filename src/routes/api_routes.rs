use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::culture;
use crate::errors::AppError;
use crate::models::{ChoiceRequest, SaveStoryRequest, StoryRequest};
use crate::service::StoryService;

// ── Reference data ───────────────────────────────────────────────────────────

/// GET `/api/cultures`: civilizations and story types for the form
pub async fn reference_data_handler() -> impl IntoResponse {
    Json(culture::reference_data())
}

// ── Story sessions ───────────────────────────────────────────────────────────

/// POST `/api/sessions`: generate the first chapter of a new story
pub async fn start_story_handler(
    State(svc): State<StoryService>,
    Json(request): Json<StoryRequest>,
) -> Response {
    match svc.start_story(request).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/api/sessions/{id}`: current projection of a live story
pub async fn session_view_handler(
    Path(id): Path<Uuid>,
    State(svc): State<StoryService>,
) -> Response {
    match svc.view(id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/api/sessions/{id}/choices`: pick an option and get the next chapter
pub async fn choose_handler(
    Path(id): Path<Uuid>,
    State(svc): State<StoryService>,
    Json(choice): Json<ChoiceRequest>,
) -> Response {
    match svc.choose(id, &choice.label).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE `/api/sessions/{id}`: reader left the story
pub async fn abandon_handler(
    Path(id): Path<Uuid>,
    State(svc): State<StoryService>,
) -> Response {
    match svc.abandon(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/api/sessions/{id}/save`: persist the story as read so far
pub async fn save_session_handler(
    Path(id): Path<Uuid>,
    State(svc): State<StoryService>,
    Json(body): Json<SaveStoryRequest>,
) -> Response {
    match svc.save_story(id, body.title).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => error_response(&e),
    }
}

// ── Saved stories ────────────────────────────────────────────────────────────

/// GET `/api/stories`: saved stories, most recent first
pub async fn list_stories_handler(State(svc): State<StoryService>) -> Response {
    match svc.list_stories().await {
        Ok(stories) => Json(stories).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/api/stories/stats`
pub async fn stats_handler(State(svc): State<StoryService>) -> Response {
    match svc.stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/api/stories/{id}`
pub async fn get_story_handler(
    Path(id): Path<String>,
    State(svc): State<StoryService>,
) -> Response {
    match svc.get_story(&id).await {
        Ok(story) => Json(story).into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE `/api/stories/{id}`
pub async fn delete_story_handler(
    Path(id): Path<String>,
    State(svc): State<StoryService>,
) -> Response {
    match svc.delete_story(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

// ── Helper ────────────────────────────────────────────────────────────────────

pub fn status_for(err: &AppError) -> StatusCode {
    if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_conflict() {
        StatusCode::CONFLICT
    } else if err.is_agent_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else if err.is_generation() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(err: &AppError) -> Response {
    (status_for(err), Json(json!({ "error": err.to_string() }))).into_response()
}
