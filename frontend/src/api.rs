use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;

use crate::models::{
    ChoiceRequest, ErrorBody, ReferenceData, SaveStoryRequest, SavedStory, StoryRequest,
    StoryStats, StoryView,
};

/// Base URL of the backend API server.
const API_BASE: &str = "http://localhost:8080";

/// Fetches the civilizations and story types offered by the form.
pub async fn fetch_reference_data() -> Result<ReferenceData, String> {
    let resp = Request::get(&format!("{API_BASE}/api/cultures"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    read_json(resp).await
}

/// Starts a story; the backend answers once the first chapter is written.
pub async fn start_story(request: &StoryRequest) -> Result<StoryView, String> {
    let resp = Request::post(&format!("{API_BASE}/api/sessions"))
        .json(request)
        .map_err(|e| format!("Serialize error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    read_json(resp).await
}

/// Current projection of a live story.
pub async fn fetch_session(session_id: &str) -> Result<StoryView, String> {
    let resp = Request::get(&format!("{API_BASE}/api/sessions/{session_id}"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    read_json(resp).await
}

/// Submits a choice and waits for the next chapter.
pub async fn choose(session_id: &str, label: &str) -> Result<StoryView, String> {
    let body = ChoiceRequest { label: label.to_string() };
    let resp = Request::post(&format!("{API_BASE}/api/sessions/{session_id}/choices"))
        .json(&body)
        .map_err(|e| format!("Serialize error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    read_json(resp).await
}

/// Drops the live session on the server.
pub async fn abandon(session_id: &str) -> Result<(), String> {
    let resp = Request::delete(&format!("{API_BASE}/api/sessions/{session_id}"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    expect_success(resp).await
}

pub async fn save_session(session_id: &str, title: Option<String>) -> Result<SavedStory, String> {
    let body = SaveStoryRequest { title };
    let resp = Request::post(&format!("{API_BASE}/api/sessions/{session_id}/save"))
        .json(&body)
        .map_err(|e| format!("Serialize error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    read_json(resp).await
}

pub async fn fetch_stories() -> Result<Vec<SavedStory>, String> {
    let resp = Request::get(&format!("{API_BASE}/api/stories"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    read_json(resp).await
}

pub async fn fetch_stats() -> Result<StoryStats, String> {
    let resp = Request::get(&format!("{API_BASE}/api/stories/stats"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    read_json(resp).await
}

pub async fn delete_story(id: &str) -> Result<(), String> {
    let resp = Request::delete(&format!("{API_BASE}/api/stories/{id}"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;
    expect_success(resp).await
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, String> {
    if !resp.ok() {
        return Err(server_error(resp).await);
    }
    resp.json::<T>()
        .await
        .map_err(|e| format!("Parse error: {e}"))
}

async fn expect_success(resp: Response) -> Result<(), String> {
    if resp.ok() {
        Ok(())
    } else {
        Err(server_error(resp).await)
    }
}

/// Prefers the backend's `{"error": ...}` message over the bare status.
async fn server_error(resp: Response) -> String {
    let status = resp.status();
    match resp.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("Server error: {status}"),
    }
}
