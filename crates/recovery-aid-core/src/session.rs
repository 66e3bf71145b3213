use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use recovery_aid_advice::{
    AdviceFormatter, AdviceRequest, AdviceResponse, AdviceService, ConfigurationError,
    PromptVariant,
};
use recovery_aid_intake::{
    Answer, AnswerSet, ApplicableQuestion, IntakeError, IntakeRecord, Questionnaire,
    QuestionnaireVariant,
};
use recovery_aid_logging::{LogEvent, Logger};

use crate::error::SessionError;
use crate::state::SubmitState;
use crate::view::{QuestionView, SessionSnapshot};

/// The advice backend a session submits to, or why there is none
pub type ServiceHandle = Result<Arc<dyn AdviceService>, ConfigurationError>;

/// One user's pass through the questionnaire
pub struct IntakeSession {
    id: String,
    variant: QuestionnaireVariant,
    questionnaire: &'static Questionnaire,
    formatter: AdviceFormatter,
    answers: AnswerSet,
    state: SubmitState,
    service: ServiceHandle,
    logger: Arc<Logger>,
    record: Option<IntakeRecord>,
    response: Option<AdviceResponse>,
}

impl IntakeSession {
    pub fn new(
        variant: QuestionnaireVariant,
        prompt: PromptVariant,
        service: ServiceHandle,
        logger: Arc<Logger>,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        logger.log(&LogEvent::SessionStarted {
            session_id: id.clone(),
            questionnaire: variant.to_string(),
            prompt: prompt.to_string(),
        });

        Self {
            id,
            variant,
            questionnaire: variant.questionnaire(),
            formatter: AdviceFormatter::new(prompt),
            answers: AnswerSet::new(),
            state: SubmitState::Idle,
            service,
            logger,
            record: None,
            response: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn variant(&self) -> QuestionnaireVariant {
        self.variant
    }

    pub fn prompt(&self) -> PromptVariant {
        self.formatter.prompt()
    }

    pub fn questionnaire(&self) -> &'static Questionnaire {
        self.questionnaire
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    /// The record that was sent, once the session is done
    pub fn record(&self) -> Option<&IntakeRecord> {
        self.record.as_ref()
    }

    pub fn response(&self) -> Option<&AdviceResponse> {
        self.response.as_ref()
    }

    pub fn applicable_questions(&self) -> Vec<ApplicableQuestion<'_>> {
        self.questionnaire.applicable_questions(&self.answers)
    }

    pub fn missing_answers(&self) -> Vec<&'static str> {
        self.questionnaire.missing_answers(&self.answers)
    }

    pub fn record_answer(&mut self, question: &str, answer: Answer) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.questionnaire
            .record_answer(&mut self.answers, question, answer)?;

        self.logger.log(&LogEvent::AnswerRecorded {
            session_id: self.id.clone(),
            question: question.to_string(),
            remaining: self.missing_answers().len(),
        });
        Ok(())
    }

    /// Remove an answer. Returns the previous value, if there was one.
    pub fn clear_answer(&mut self, question: &str) -> Result<Option<Answer>, SessionError> {
        self.ensure_editable()?;
        if self.questionnaire.question(question).is_none() {
            return Err(IntakeError::UnknownQuestion(question.to_string()).into());
        }
        Ok(self.answers.remove(question))
    }

    /// Record a whole answer set in questionnaire order.
    ///
    /// Answers to questions that do not apply once the earlier answers are
    /// in place are dropped.
    pub fn load_answers(&mut self, answers: &AnswerSet) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let questionnaire = self.questionnaire;
        if let Some((unknown, _)) = answers
            .iter()
            .find(|(id, _)| questionnaire.question(id).is_none())
        {
            return Err(IntakeError::UnknownQuestion(unknown.to_string()).into());
        }

        for question in questionnaire.questions() {
            let Some(answer) = answers.get(question.id) else {
                continue;
            };
            let applicable = self
                .applicable_questions()
                .iter()
                .any(|q| q.question.id == question.id);
            if !applicable {
                debug!(question = question.id, "Skipping answer to a question that does not apply");
                continue;
            }
            self.record_answer(question.id, answer.clone())?;
        }
        Ok(())
    }

    /// Render the request that submitting now would send, without sending it
    pub fn preview(&self) -> Result<AdviceRequest, SessionError> {
        let record = self.questionnaire.submit(&self.answers)?;
        Ok(self.formatter.format(&record))
    }

    /// Validate, format and send the answers.
    ///
    /// Any failure leaves the answers untouched and the session idle, so
    /// the user can fix the form or simply submit again.
    pub async fn submit(&mut self) -> Result<&AdviceResponse, SessionError> {
        if self.state.is_done() {
            return Err(SessionError::AlreadySubmitted);
        }

        self.transition(SubmitState::Validating);
        let record = match self.questionnaire.submit(&self.answers) {
            Ok(record) => record,
            Err(e) => {
                if let IntakeError::IncompleteAnswer { missing } = &e {
                    self.logger.log(&LogEvent::SubmissionRejected {
                        session_id: self.id.clone(),
                        missing: missing.clone(),
                    });
                }
                self.transition(SubmitState::Idle);
                return Err(e.into());
            }
        };

        self.transition(SubmitState::BuildingRequest);
        let service = match &self.service {
            Ok(service) => Arc::clone(service),
            Err(e) => {
                let e = e.clone();
                debug!(session_id = %self.id, "Submission blocked by configuration");
                self.transition(SubmitState::Idle);
                return Err(e.into());
            }
        };
        let request = self.formatter.format(&record);

        self.logger.log(&LogEvent::AdviceRequested {
            session_id: self.id.clone(),
            prompt: request.prompt.to_string(),
            user_message_chars: request.user.chars().count(),
        });
        self.transition(SubmitState::AwaitingResponse);

        let started = Instant::now();
        let in_flight = InFlight {
            session_id: &self.id,
            state: &mut self.state,
            settled: false,
        };
        let result = service.request_advice(&request).await;
        in_flight.settle();

        match result {
            Ok(response) => {
                self.logger.log(&LogEvent::AdviceReceived {
                    session_id: self.id.clone(),
                    response_chars: response.text.chars().count(),
                    duration_secs: started.elapsed().as_secs_f64(),
                });
                info!(session_id = %self.id, service = service.name(), "Advice received");
                self.record = Some(record);
                self.transition(SubmitState::Done);
                Ok(self.response.insert(response))
            }
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Advice request failed");
                self.logger.log(&LogEvent::AdviceFailed {
                    session_id: self.id.clone(),
                    error: e.to_string(),
                    duration_secs: started.elapsed().as_secs_f64(),
                });
                self.transition(SubmitState::Idle);
                Err(e.into())
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            questionnaire: self.variant,
            prompt: self.prompt(),
            state: self.state,
            answers: self.answers.clone(),
            applicable: self
                .applicable_questions()
                .into_iter()
                .map(QuestionView::from)
                .collect(),
            missing: self.missing_answers(),
            advice: self.response.as_ref().map(|r| r.text.clone()),
        }
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        if self.state.is_done() {
            Err(SessionError::AlreadySubmitted)
        } else {
            Ok(())
        }
    }

    fn transition(&mut self, next: SubmitState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        debug!(session_id = %self.id, from = %self.state, to = %next, "Submit state");
        self.state = next;
    }
}

/// Puts the session back to idle if a submit is dropped while waiting on
/// the service.
struct InFlight<'a> {
    session_id: &'a str,
    state: &'a mut SubmitState,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled && *self.state == SubmitState::AwaitingResponse {
            warn!(session_id = %self.session_id, "Advice request cancelled");
            *self.state = SubmitState::Idle;
        }
    }
}
