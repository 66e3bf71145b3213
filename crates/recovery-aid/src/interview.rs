//! Interactive terminal form.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Confirm, Input, MultiSelect, Select};

use recovery_aid_advice::AdviceResponse;
use recovery_aid_core::{IntakeSession, QuestionView, SessionError};
use recovery_aid_intake::{Answer, AnswerKind};

use crate::output::{print_advice, print_request};

pub struct AskOptions {
    pub dry_run: bool,
    pub answers_out: Option<PathBuf>,
}

pub async fn run_interview(mut session: IntakeSession, options: AskOptions) -> Result<()> {
    loop {
        fill_form(&mut session)?;

        if let Some(ref path) = options.answers_out {
            let json = serde_json::to_string_pretty(session.answers())?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} Answers saved to {}", "✓".bright_green(), path.display());
        }

        if options.dry_run {
            print_request(&session.preview()?);
            return Ok(());
        }

        let confirm = || {
            Confirm::new()
                .with_prompt("Submit again?")
                .default(true)
                .interact()
        };
        match submit_until_done(&mut session, confirm).await? {
            Some(response) => {
                print_advice(&response);
                return Ok(());
            }
            // Answers changed underneath us; go back to the form
            None => continue,
        }
    }
}

/// Submit, asking `confirm` whether to retry after service errors.
///
/// Returns `None` when the form needs more answers.
async fn submit_until_done<F>(
    session: &mut IntakeSession,
    mut confirm: F,
) -> Result<Option<AdviceResponse>>
where
    F: FnMut() -> dialoguer::Result<bool>,
{
    loop {
        match session.submit().await {
            Ok(response) => return Ok(Some(response.clone())),
            Err(SessionError::Intake(_)) => return Ok(None),
            Err(SessionError::AdviceService(e)) => {
                eprintln!("{} {}", "✗".bright_red(), e.to_string().bright_red());
                if !confirm().context("Failed to read confirmation")? {
                    return Err(SessionError::AdviceService(e).into());
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Ask the first unanswered question until nothing is left
fn fill_form(session: &mut IntakeSession) -> Result<()> {
    let mut section = "";
    loop {
        let next = session
            .applicable_questions()
            .into_iter()
            .find(|q| q.answer.is_none() || q.is_missing())
            .map(QuestionView::from);
        let Some(question) = next else {
            return Ok(());
        };

        if question.section != section {
            section = question.section;
            eprintln!();
            eprintln!("{}", section.bold().bright_white());
        }
        if let Some(help) = question.help {
            eprintln!("{}", help.dimmed());
        }

        let answer = ask(&question)?;
        if let Err(e) = session.record_answer(question.id, answer) {
            eprintln!("{} {}", "⚠".bright_yellow(), e);
        }
    }
}

fn ask(question: &QuestionView) -> Result<Answer> {
    let answer = match question.kind {
        AnswerKind::SingleChoice => {
            let index = Select::new()
                .with_prompt(question.text)
                .items(&question.options)
                .default(0)
                .interact()?;
            Answer::text(question.options[index])
        }
        AnswerKind::MultiChoice => loop {
            let picked = MultiSelect::new()
                .with_prompt(format!("{} (space to select, enter to confirm)", question.text))
                .items(&question.options)
                .interact()?;
            if picked.is_empty() && question.required {
                eprintln!("{} Select at least one option", "⚠".bright_yellow());
                continue;
            }
            break Answer::selections(picked.into_iter().map(|i| question.options[i]));
        },
        AnswerKind::FreeText { .. } => {
            let text: String = Input::new()
                .with_prompt(question.text)
                .allow_empty(!question.required)
                .interact_text()?;
            Answer::text(text.trim())
        }
        AnswerKind::Scale { min, max, default } => {
            let value: i64 = Input::new()
                .with_prompt(format!("{} ({}-{})", question.text, min, max))
                .default(default)
                .validate_with(move |v: &i64| {
                    if (min..=max).contains(v) {
                        Ok(())
                    } else {
                        Err(format!("Enter a number from {} to {}", min, max))
                    }
                })
                .interact_text()?;
            Answer::scale(value)
        }
    };
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use recovery_aid_advice::{AdviceError, AdviceRequest, AdviceService, PromptVariant};
    use recovery_aid_core::SubmitState;
    use recovery_aid_intake::{AnswerSet, QuestionnaireVariant};
    use recovery_aid_logging::Logger;

    /// Fails the first `failures` requests
    struct FlakyService {
        failures: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AdviceService for FlakyService {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn request_advice(
            &self,
            _request: &AdviceRequest,
        ) -> Result<AdviceResponse, AdviceError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                Err(AdviceError::Transport("connection reset".to_string()))
            } else {
                Ok(AdviceResponse {
                    text: "Rest the knee.".to_string(),
                })
            }
        }
    }

    fn knee_session(failures: usize) -> IntakeSession {
        let answers: AnswerSet = serde_json::from_value(serde_json::json!({
            "user_name": "Alex",
            "body_part": "Knee",
            "pain_type": ["Sharp pain"],
            "pain_severity": 7,
            "pain_occurrence": ["During exercise"],
            "pain_duration": "1–3 days ago",
            "activity_context": "Running",
            "relief_methods": ["Rest"],
            "relief_effectiveness": "Somewhat effective",
            "pain_localization": "Localized to a specific joint or spot",
            "functional_impact": "Minimal impact",
            "red_flags": ["No"],
            "previous_injuries": "No"
        }))
        .unwrap();

        let service = Arc::new(FlakyService {
            failures,
            calls: AtomicUsize::new(0),
        });
        let mut session = IntakeSession::new(
            QuestionnaireVariant::Baseline,
            PromptVariant::Baseline,
            Ok(service),
            Arc::new(Logger::quiet()),
        );
        session.load_answers(&answers).unwrap();
        session
    }

    #[tokio::test]
    async fn test_confirm_failure_is_reported() {
        let mut session = knee_session(1);
        let result = submit_until_done(&mut session, || {
            Err(std::io::Error::new(std::io::ErrorKind::NotConnected, "not a terminal").into())
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to read confirmation"));
        assert_eq!(session.state(), SubmitState::Idle);
    }

    #[tokio::test]
    async fn test_confirmed_retry_submits_again() {
        let mut session = knee_session(1);
        let response = submit_until_done(&mut session, || Ok(true))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.text, "Rest the knee.");
        assert_eq!(session.state(), SubmitState::Done);
    }

    #[tokio::test]
    async fn test_declined_retry_returns_the_service_error() {
        let mut session = knee_session(1);
        let err = submit_until_done(&mut session, || Ok(false))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
