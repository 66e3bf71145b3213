use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use recovery_aid_advice::{
    AdviceError, AdviceRequest, AdviceResponse, AdviceService, ConfigurationError, PromptVariant,
    BASELINE_INSTRUCTIONS,
};
use recovery_aid_core::{IntakeSession, ServiceHandle, SessionError, SubmitState};
use recovery_aid_intake::fields::*;
use recovery_aid_intake::values::*;
use recovery_aid_intake::{Answer, AnswerSet, IntakeError, QuestionnaireVariant};
use recovery_aid_logging::{LogFormat, Logger};

/// Replays canned outcomes and remembers what it was sent
struct ScriptedService {
    outcomes: Mutex<VecDeque<Result<String, String>>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<AdviceRequest>>,
}

impl ScriptedService {
    fn new(outcomes: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(
                outcomes
                    .into_iter()
                    .map(|o| o.map(String::from).map_err(String::from))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdviceService for ScriptedService {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn request_advice(&self, request: &AdviceRequest) -> Result<AdviceResponse, AdviceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(AdviceResponse { text }),
            Some(Err(message)) => Err(AdviceError::Transport(message)),
            None => Err(AdviceError::Transport("no scripted outcome".to_string())),
        }
    }
}

/// Never answers its first request, then replies normally
struct StallingService {
    calls: AtomicUsize,
}

#[async_trait]
impl AdviceService for StallingService {
    fn name(&self) -> &str {
        "stalling"
    }

    async fn request_advice(&self, _request: &AdviceRequest) -> Result<AdviceResponse, AdviceError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            std::future::pending::<()>().await;
        }
        Ok(AdviceResponse {
            text: "Ice and rest.".to_string(),
        })
    }
}

fn session_with(service: ServiceHandle) -> IntakeSession {
    IntakeSession::new(
        QuestionnaireVariant::Baseline,
        PromptVariant::Baseline,
        service,
        Arc::new(Logger::quiet()),
    )
}

fn answer_knee(session: &mut IntakeSession) {
    let steps = [
        (USER_NAME, Answer::text("Alex")),
        (BODY_PART, Answer::text("Knee")),
        (PAIN_TYPE, Answer::selections(["Sharp pain", "Stiffness"])),
        (PAIN_SEVERITY, Answer::scale(7)),
        (PAIN_OCCURRENCE, Answer::selections(["During exercise"])),
        (PAIN_DURATION, Answer::text("1–3 days ago")),
        (ACTIVITY_CONTEXT, Answer::text("Running")),
        (RELIEF_METHODS, Answer::selections(["Rest"])),
        (RELIEF_EFFECTIVENESS, Answer::text("Somewhat effective")),
        (PAIN_LOCALIZATION, Answer::text(LOCALIZED)),
        (FUNCTIONAL_IMPACT, Answer::text("Minimal impact")),
        (RED_FLAGS, Answer::selections(["No"])),
        (PREVIOUS_INJURIES, Answer::text("No")),
    ];
    for (question, answer) in steps {
        session
            .record_answer(question, answer)
            .unwrap_or_else(|e| panic!("failed to record {}: {}", question, e));
    }
}

// ============================================================
// Submit protocol
// ============================================================

#[tokio::test]
async fn test_successful_submit_freezes_session() {
    let service = ScriptedService::new(vec![Ok("Do some hip bridges.")]);
    let mut session = session_with(Ok(service.clone()));
    answer_knee(&mut session);

    let response = session.submit().await.unwrap();
    assert_eq!(response.text, "Do some hip bridges.");
    assert_eq!(session.state(), SubmitState::Done);
    assert_eq!(service.calls(), 1);

    let sent = service.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(sent.system, BASELINE_INSTRUCTIONS);
    assert!(sent.user.contains("Sharp pain, Stiffness"));
    assert!(sent.user.contains("- Pain severity on a scale of 1 to 10: 7"));

    let record = session.record().unwrap();
    assert_eq!(record.field(DOMS_IMPROVEMENT), NOT_APPLICABLE);
}

#[tokio::test]
async fn test_done_session_rejects_edits_and_resubmission() {
    let service = ScriptedService::new(vec![Ok("advice")]);
    let mut session = session_with(Ok(service.clone()));
    answer_knee(&mut session);
    session.submit().await.unwrap();
    let before = session.answers().clone();

    let err = session
        .record_answer(USER_NAME, Answer::text("Sam"))
        .unwrap_err();
    assert!(matches!(err, SessionError::AlreadySubmitted));
    assert!(matches!(
        session.clear_answer(USER_NAME),
        Err(SessionError::AlreadySubmitted)
    ));
    assert!(matches!(
        session.submit().await,
        Err(SessionError::AlreadySubmitted)
    ));

    assert_eq!(session.answers(), &before);
    assert_eq!(service.calls(), 1);
}

#[tokio::test]
async fn test_transport_error_keeps_answers_and_allows_resubmit() {
    let service = ScriptedService::new(vec![Err("connection reset"), Ok("advice")]);
    let mut session = session_with(Ok(service.clone()));
    answer_knee(&mut session);
    let before = session.answers().clone();

    let err = session.submit().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::AdviceService(AdviceError::Transport(_))
    ));
    assert_eq!(session.state(), SubmitState::Idle);
    assert_eq!(session.answers(), &before);
    assert!(session.response().is_none());

    let response = session.submit().await.unwrap();
    assert_eq!(response.text, "advice");
    assert_eq!(service.calls(), 2);
}

#[tokio::test]
async fn test_incomplete_submit_returns_to_idle_without_calling_service() {
    let service = ScriptedService::new(vec![]);
    let mut session = session_with(Ok(service.clone()));
    session.record_answer(USER_NAME, Answer::text("Alex")).unwrap();

    let err = session.submit().await.unwrap_err();
    let missing = err.missing_questions().unwrap();
    assert!(missing.contains(&BODY_PART.to_string()));
    assert!(!missing.contains(&USER_NAME.to_string()));
    assert_eq!(session.state(), SubmitState::Idle);
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_missing_credential_blocks_submission_but_not_the_form() {
    let mut session = session_with(Err(ConfigurationError::MissingCredential {
        var: "OPENAI_API_KEY".to_string(),
    }));
    answer_knee(&mut session);
    assert!(session.preview().is_ok());

    for _ in 0..2 {
        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
        assert_eq!(session.state(), SubmitState::Idle);
    }
}

#[tokio::test]
async fn test_cancelled_submit_returns_to_idle() {
    let service = Arc::new(StallingService {
        calls: AtomicUsize::new(0),
    });
    let mut session = session_with(Ok(service.clone()));
    answer_knee(&mut session);

    let timed_out = tokio::time::timeout(Duration::from_millis(50), session.submit())
        .await
        .is_err();
    assert!(timed_out);
    assert_eq!(session.state(), SubmitState::Idle);
    assert_eq!(session.snapshot().state, SubmitState::Idle);
    assert!(session.response().is_none());

    let response = session.submit().await.unwrap();
    assert_eq!(response.text, "Ice and rest.");
    assert_eq!(session.state(), SubmitState::Done);
    assert_eq!(service.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_missing_credential_is_not_logged_per_submit() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("events.jsonl");
    let logger = Logger::with_file(LogFormat::Compact, &log_path).unwrap();
    let mut session = IntakeSession::new(
        QuestionnaireVariant::Baseline,
        PromptVariant::Baseline,
        Err(ConfigurationError::MissingCredential {
            var: "OPENAI_API_KEY".to_string(),
        }),
        Arc::new(logger),
    );
    answer_knee(&mut session);

    for _ in 0..2 {
        assert!(session.submit().await.is_err());
    }
    drop(session);

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("session_started"));
    assert!(!log.contains("configuration_missing"));
}

// ============================================================
// Editing
// ============================================================

#[test]
fn test_clear_answer_rehides_follow_up() {
    let mut session = session_with(Ok(ScriptedService::new(vec![])));
    session
        .record_answer(PREVIOUS_INJURIES, Answer::text("Yes"))
        .unwrap();
    assert!(session.missing_answers().contains(&INJURY_DETAILS));

    let previous = session.clear_answer(PREVIOUS_INJURIES).unwrap();
    assert_eq!(previous, Some(Answer::text("Yes")));
    assert!(!session.missing_answers().contains(&INJURY_DETAILS));

    assert!(matches!(
        session.clear_answer("favourite_colour"),
        Err(SessionError::Intake(IntakeError::UnknownQuestion(_)))
    ));
}

#[test]
fn test_load_answers_records_in_questionnaire_order() {
    let mut session = session_with(Ok(ScriptedService::new(vec![])));
    let answers: AnswerSet = serde_json::from_value(serde_json::json!({
        "specific_part": "Other",
        "other_part": "Rhomboids",
        "body_part": UPPER_BACK,
        "user_name": "Alex",
        "clicking_with_pain": "Yes"
    }))
    .unwrap();

    session.load_answers(&answers).unwrap();
    assert_eq!(session.answers().get(OTHER_PART), Some(&Answer::text("Rhomboids")));
    // Clicking was never selected, so its follow-up is dropped
    assert!(!session.answers().contains(CLICKING_WITH_PAIN));
}

#[test]
fn test_load_answers_rejects_unknown_questions() {
    let mut session = session_with(Ok(ScriptedService::new(vec![])));
    let mut answers = AnswerSet::new();
    answers.insert("favourite_colour", Answer::text("Blue"));

    let err = session.load_answers(&answers).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Intake(IntakeError::UnknownQuestion(ref id)) if id == "favourite_colour"
    ));
}

#[test]
fn test_snapshot_lists_applicable_questions() {
    let mut session = session_with(Ok(ScriptedService::new(vec![])));
    session
        .record_answer(BODY_PART, Answer::text(UPPER_BACK))
        .unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, SubmitState::Idle);
    let area = snapshot
        .applicable
        .iter()
        .find(|q| q.id == SPECIFIC_PART)
        .unwrap();
    assert_eq!(area.options, vec!["Traps", "Scapulae", "Lats", "Other"]);
    assert!(snapshot.missing.contains(&SPECIFIC_PART));

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["state"], "idle");
    assert_eq!(json["questionnaire"], "baseline");
    assert_eq!(json["answers"]["body_part"], UPPER_BACK);
}
