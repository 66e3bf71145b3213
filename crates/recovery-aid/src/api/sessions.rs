use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use recovery_aid_advice::PromptVariant;
use recovery_aid_core::SessionSnapshot;
use recovery_aid_intake::{Answer, QuestionnaireVariant};

use super::{ApiError, AppState, SharedSession};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateSession {
    pub questionnaire: Option<QuestionnaireVariant>,
    pub prompt: Option<PromptVariant>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub advice: String,
}

fn find_session(state: &AppState, id: &str) -> Result<SharedSession, ApiError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| ApiError::not_found("session", id))
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(params): Json<CreateSession>,
) -> Result<(StatusCode, Json<SessionSnapshot>), ApiError> {
    let session = state.app.new_session(params.questionnaire, params.prompt);
    let snapshot = session.snapshot();
    state.sessions.insert(session);
    info!(session_id = %snapshot.id, active = state.sessions.len(), "Created session");
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = find_session(&state, &id)?;
    let session = session.lock().await;
    Ok(Json(session.snapshot()))
}

pub async fn record_answer(
    State(state): State<AppState>,
    Path((id, question)): Path<(String, String)>,
    Json(answer): Json<Answer>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = find_session(&state, &id)?;
    let mut session = session.lock().await;
    session.record_answer(&question, answer)?;
    Ok(Json(session.snapshot()))
}

pub async fn clear_answer(
    State(state): State<AppState>,
    Path((id, question)): Path<(String, String)>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = find_session(&state, &id)?;
    let mut session = session.lock().await;
    session.clear_answer(&question)?;
    Ok(Json(session.snapshot()))
}

pub async fn submit_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let session = find_session(&state, &id)?;
    let mut session = session.lock().await;
    let response = session.submit().await?;
    Ok(Json(SubmitResponse {
        advice: response.text.clone(),
    }))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("session", &id))
    }
}
