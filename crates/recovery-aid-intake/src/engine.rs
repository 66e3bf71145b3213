use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::answer::{Answer, AnswerSet};
use crate::error::IntakeError;
use crate::question::{AnswerKind, Applicability, OptionSource, Question, QuestionId};
use crate::record::{IntakeRecord, RecordEntry};

/// A question that applies given the current answers, with its options
/// resolved and its current (valid) answer, if any.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicableQuestion<'a> {
    #[serde(flatten)]
    pub question: &'a Question,
    pub options: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<&'a Answer>,
}

impl ApplicableQuestion<'_> {
    /// Whether the question still needs an answer before submission
    pub fn is_missing(&self) -> bool {
        self.question.required && self.answer.map_or(true, Answer::is_blank)
    }
}

/// An ordered, validated set of questions
#[derive(Debug, Clone)]
pub struct Questionnaire {
    name: &'static str,
    questions: Vec<Question>,
}

/// What later questions can see of an earlier one during evaluation
#[derive(Debug, Clone, Copy)]
enum Seen<'a> {
    Answered(&'a Answer),
    Defaulted(&'static str),
    Unanswered,
}

impl<'a> Seen<'a> {
    fn text(&self) -> Option<&'a str> {
        match *self {
            Seen::Answered(answer) => answer.as_text(),
            Seen::Defaulted(value) => Some(value),
            Seen::Unanswered => None,
        }
    }

    fn includes(&self, value: &str) -> bool {
        match *self {
            Seen::Answered(answer) => answer.includes(value),
            Seen::Defaulted(_) | Seen::Unanswered => false,
        }
    }
}

struct Evaluation<'a> {
    question: &'a Question,
    options: Vec<&'static str>,
    applicable: bool,
    answer: Option<&'a Answer>,
}

impl Questionnaire {
    /// Build a questionnaire, checking that every rule only looks backwards.
    pub fn new(name: &'static str, questions: Vec<Question>) -> Result<Self, IntakeError> {
        let mut earlier: HashMap<QuestionId, &Question> = HashMap::new();

        for question in &questions {
            if earlier.contains_key(question.id) {
                return Err(IntakeError::InvalidQuestionnaire(format!(
                    "duplicate question id '{}'",
                    question.id
                )));
            }

            if let Some(parent) = question.applicability.references() {
                let parent = earlier.get(parent).ok_or_else(|| {
                    IntakeError::InvalidQuestionnaire(format!(
                        "'{}' depends on '{}', which does not come before it",
                        question.id, parent
                    ))
                })?;
                let kind_ok = match question.applicability {
                    Applicability::AnswerIncludes { .. } => parent.kind == AnswerKind::MultiChoice,
                    _ => parent.kind != AnswerKind::MultiChoice,
                };
                if !kind_ok {
                    return Err(IntakeError::InvalidQuestionnaire(format!(
                        "'{}' uses a rule that does not match the kind of '{}'",
                        question.id, parent.id
                    )));
                }
            }

            if let Some(on) = question.options.key() {
                if !earlier.contains_key(on) {
                    return Err(IntakeError::InvalidQuestionnaire(format!(
                        "options of '{}' are keyed on '{}', which does not come before it",
                        question.id, on
                    )));
                }
            }

            let has_source = !matches!(question.options, OptionSource::None);
            if question.is_choice() != has_source {
                return Err(IntakeError::InvalidQuestionnaire(format!(
                    "'{}' has options that do not match its answer kind",
                    question.id
                )));
            }

            if question.skip_default.is_some() && question.applicability == Applicability::Always
            {
                return Err(IntakeError::InvalidQuestionnaire(format!(
                    "'{}' is never skipped but declares a skip default",
                    question.id
                )));
            }

            if let AnswerKind::Scale { min, max, default } = question.kind {
                if !(min <= default && default <= max) {
                    return Err(IntakeError::InvalidQuestionnaire(format!(
                        "'{}' has an invalid scale {}..={} (default {})",
                        question.id, min, max, default
                    )));
                }
            }

            earlier.insert(question.id, question);
        }

        Ok(Self { name, questions })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All questions in static order, applicable or not
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// The questions that apply to the given answers, in questionnaire order.
    pub fn applicable_questions<'a>(&'a self, answers: &'a AnswerSet) -> Vec<ApplicableQuestion<'a>> {
        self.evaluate(answers)
            .into_iter()
            .filter(|e| e.applicable)
            .map(|e| ApplicableQuestion {
                question: e.question,
                options: e.options,
                answer: e.answer,
            })
            .collect()
    }

    /// Ids of applicable, required questions without a usable answer
    pub fn missing_answers(&self, answers: &AnswerSet) -> Vec<QuestionId> {
        self.applicable_questions(answers)
            .iter()
            .filter(|q| q.is_missing())
            .map(|q| q.question.id)
            .collect()
    }

    /// Validate an answer against the current state of the form and store it.
    ///
    /// Multi-choice selections are deduplicated and kept in option order.
    pub fn record_answer(
        &self,
        answers: &mut AnswerSet,
        question_id: &str,
        answer: Answer,
    ) -> Result<(), IntakeError> {
        let question = self
            .question(question_id)
            .ok_or_else(|| IntakeError::UnknownQuestion(question_id.to_string()))?;

        let options = {
            let evaluation = self.evaluate(answers);
            let current = evaluation
                .into_iter()
                .find(|e| e.question.id == question.id)
                .ok_or_else(|| IntakeError::UnknownQuestion(question_id.to_string()))?;
            if !current.applicable {
                return Err(IntakeError::invalid(
                    question.id,
                    "question does not apply to the current answers",
                ));
            }
            current.options
        };

        check_answer(question, &options, &answer)
            .map_err(|reason| IntakeError::invalid(question.id, reason))?;

        let answer = normalize(question, &options, answer);
        debug!(question = question.id, "Recorded answer");
        answers.insert(question.id, answer);
        Ok(())
    }

    /// Freeze the answers into an intake record.
    ///
    /// Applicability is recomputed from `answers` here, so an answer that
    /// revealed new questions after they were last listed still has to have
    /// those questions answered.
    pub fn submit(&self, answers: &AnswerSet) -> Result<IntakeRecord, IntakeError> {
        let mut entries = Vec::new();
        let mut missing = Vec::new();

        for evaluation in self.evaluate(answers) {
            let question = evaluation.question;

            if !evaluation.applicable {
                if let Some(default) = question.skip_default {
                    entries.push(RecordEntry {
                        question: question.id,
                        answer: Answer::text(default),
                        defaulted: true,
                    });
                }
                continue;
            }

            match evaluation.answer {
                Some(answer) if !(question.required && answer.is_blank()) => {
                    entries.push(RecordEntry {
                        question: question.id,
                        answer: answer.clone(),
                        defaulted: false,
                    });
                }
                _ if question.required => missing.push(question.id.to_string()),
                _ => entries.push(RecordEntry {
                    question: question.id,
                    answer: empty_answer(question.kind),
                    defaulted: false,
                }),
            }
        }

        if !missing.is_empty() {
            debug!(questionnaire = self.name, missing = ?missing, "Submission incomplete");
            return Err(IntakeError::IncompleteAnswer { missing });
        }

        debug!(
            questionnaire = self.name,
            entries = entries.len(),
            "Built intake record"
        );
        Ok(IntakeRecord::new(entries))
    }

    /// One forward pass over the questions. A rule only sees an earlier
    /// answer if that question applied and the answer is still valid.
    fn evaluate<'a>(&'a self, answers: &'a AnswerSet) -> Vec<Evaluation<'a>> {
        let mut seen: HashMap<QuestionId, Seen<'a>> = HashMap::new();
        let mut evaluations = Vec::with_capacity(self.questions.len());

        for question in &self.questions {
            let keyed = question
                .options
                .key()
                .and_then(|on| seen.get(on))
                .and_then(|s| s.text());
            let options = question.options.resolve(keyed);

            let applicable = match &question.applicability {
                Applicability::Always => true,
                Applicability::AnswerIs { question: parent, value } => {
                    seen.get(parent).and_then(|s| s.text()) == Some(*value)
                }
                Applicability::AnswerIncludes { question: parent, value } => {
                    seen.get(parent).is_some_and(|s| s.includes(value))
                }
                Applicability::HasOptions => !options.is_empty(),
            };

            let answer = if applicable {
                answers
                    .get(question.id)
                    .filter(|a| check_answer(question, &options, a).is_ok())
            } else {
                None
            };

            if applicable {
                seen.insert(question.id, answer.map_or(Seen::Unanswered, Seen::Answered));
            } else if let Some(default) = question.skip_default {
                seen.insert(question.id, Seen::Defaulted(default));
            }

            evaluations.push(Evaluation {
                question,
                options,
                applicable,
                answer,
            });
        }

        evaluations
    }
}

fn check_answer(question: &Question, options: &[&str], answer: &Answer) -> Result<(), String> {
    match (question.kind, answer) {
        (AnswerKind::SingleChoice, Answer::Text(value)) => {
            if options.contains(&value.as_str()) {
                Ok(())
            } else {
                Err(format!("'{}' is not one of the available options", value))
            }
        }
        (AnswerKind::MultiChoice, Answer::Selections(values)) => {
            match values.iter().find(|v| !options.contains(&v.as_str())) {
                Some(unknown) => Err(format!("'{}' is not one of the available options", unknown)),
                None => Ok(()),
            }
        }
        (AnswerKind::FreeText { .. }, Answer::Text(_)) => Ok(()),
        (AnswerKind::Scale { min, max, .. }, Answer::Scale(value)) => {
            if (min..=max).contains(value) {
                Ok(())
            } else {
                Err(format!("{} is outside the range {}-{}", value, min, max))
            }
        }
        (AnswerKind::SingleChoice, _) => Err("expected a single option".to_string()),
        (AnswerKind::MultiChoice, _) => Err("expected a list of options".to_string()),
        (AnswerKind::FreeText { .. }, _) => Err("expected text".to_string()),
        (AnswerKind::Scale { .. }, _) => Err("expected a number".to_string()),
    }
}

fn normalize(question: &Question, options: &[&str], answer: Answer) -> Answer {
    match (question.kind, answer) {
        (AnswerKind::MultiChoice, Answer::Selections(values)) => {
            let chosen: HashSet<&str> = values.iter().map(String::as_str).collect();
            Answer::Selections(
                options
                    .iter()
                    .filter(|o| chosen.contains(*o))
                    .map(|o| o.to_string())
                    .collect(),
            )
        }
        (_, answer) => answer,
    }
}

fn empty_answer(kind: AnswerKind) -> Answer {
    match kind {
        AnswerKind::MultiChoice => Answer::Selections(Vec::new()),
        AnswerKind::Scale { default, .. } => Answer::Scale(default),
        AnswerKind::SingleChoice | AnswerKind::FreeText { .. } => Answer::Text(String::new()),
    }
}
