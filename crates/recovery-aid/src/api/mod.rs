mod questionnaires;
mod sessions;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::info;

use recovery_aid_core::{IntakeSession, SessionError};
use recovery_aid_intake::IntakeError;

use crate::app::AppContext;

pub type SharedSession = Arc<tokio::sync::Mutex<IntakeSession>>;

struct Entry {
    session: SharedSession,
    touched: Instant,
}

/// Live sessions keyed by id. Each session has its own lock.
///
/// Every lookup refreshes the entry; [`SessionRegistry::evict_idle`] drops
/// entries nobody has looked up for a while.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<String, Entry>>>,
}

impl SessionRegistry {
    pub fn insert(&self, session: IntakeSession) -> String {
        let id = session.id().to_string();
        let entry = Entry {
            session: Arc::new(tokio::sync::Mutex::new(session)),
            touched: Instant::now(),
        };
        self.lock().insert(id.clone(), entry);
        id
    }

    pub fn get(&self, id: &str) -> Option<SharedSession> {
        let mut sessions = self.lock();
        let entry = sessions.get_mut(id)?;
        entry.touched = Instant::now();
        Some(entry.session.clone())
    }

    pub fn remove(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Drop sessions untouched for longer than `ttl`. Returns how many went.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.touched.elapsed() <= ttl);
        before - sessions.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Evict idle sessions every quarter `ttl`, between one second and a minute
pub async fn sweep_idle_sessions(sessions: SessionRegistry, ttl: Duration) {
    let mut interval = tokio::time::interval(sweep_period(ttl));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let evicted = sessions.evict_idle(ttl);
        if evicted > 0 {
            info!(evicted, active = sessions.len(), "Evicted idle sessions");
        }
    }
}

fn sweep_period(ttl: Duration) -> Duration {
    (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60))
}

#[derive(Clone)]
pub struct AppState {
    pub app: AppContext,
    pub sessions: SessionRegistry,
}

pub fn create_router(app: AppContext, sessions: SessionRegistry) -> Router {
    let state = AppState { app, sessions };

    Router::new()
        .route(
            "/api/questionnaires/{variant}",
            get(questionnaires::get_questionnaire),
        )
        .route("/api/sessions", post(sessions::create_session))
        .route(
            "/api/sessions/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route(
            "/api/sessions/{id}/answers/{question}",
            put(sessions::record_answer).delete(sessions::clear_answer),
        )
        .route("/api/sessions/{id}/submit", post(sessions::submit_session))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

/// An error response with a JSON body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
                missing: None,
            },
        }
    }

    pub fn not_found(what: &str, id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Unknown {}: {}", what, id))
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        let status = match &error {
            SessionError::Intake(IntakeError::IncompleteAnswer { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            SessionError::Intake(IntakeError::UnknownQuestion(_)) => StatusCode::NOT_FOUND,
            SessionError::Intake(IntakeError::InvalidAnswer { .. }) => StatusCode::BAD_REQUEST,
            SessionError::Intake(IntakeError::InvalidQuestionnaire(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SessionError::AdviceService(_) => StatusCode::BAD_GATEWAY,
            SessionError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            SessionError::AlreadySubmitted => StatusCode::CONFLICT,
        };
        Self {
            status,
            body: ErrorBody {
                missing: error.missing_questions().map(<[String]>::to_vec),
                error: error.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use recovery_aid_advice::{ConfigurationError, PromptVariant};
    use recovery_aid_intake::QuestionnaireVariant;
    use recovery_aid_logging::Logger;

    fn new_session() -> IntakeSession {
        IntakeSession::new(
            QuestionnaireVariant::Baseline,
            PromptVariant::Baseline,
            Err(ConfigurationError::MissingCredential {
                var: "OPENAI_API_KEY".to_string(),
            }),
            Arc::new(Logger::quiet()),
        )
    }

    #[test]
    fn test_evict_idle_keeps_recently_used_sessions() {
        let registry = SessionRegistry::default();
        let used = registry.insert(new_session());
        let abandoned = registry.insert(new_session());

        std::thread::sleep(Duration::from_millis(150));
        assert!(registry.get(&used).is_some());
        std::thread::sleep(Duration::from_millis(100));

        assert_eq!(registry.evict_idle(Duration::from_millis(200)), 1);
        assert!(registry.get(&used).is_some());
        assert!(registry.get(&abandoned).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_evict_idle_with_long_ttl_keeps_everything() {
        let registry = SessionRegistry::default();
        registry.insert(new_session());
        registry.insert(new_session());
        assert_eq!(registry.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_sweep_period_is_bounded() {
        assert_eq!(sweep_period(Duration::from_secs(2)), Duration::from_secs(1));
        assert_eq!(sweep_period(Duration::from_secs(120)), Duration::from_secs(30));
        assert_eq!(sweep_period(Duration::from_secs(3600)), Duration::from_secs(60));
    }
}
