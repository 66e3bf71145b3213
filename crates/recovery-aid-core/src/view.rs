use serde::Serialize;

use recovery_aid_advice::PromptVariant;
use recovery_aid_intake::{Answer, AnswerKind, AnswerSet, ApplicableQuestion, Question, QuestionnaireVariant};

use crate::state::SubmitState;

/// An owned, serializable view of a question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    pub id: &'static str,
    pub section: &'static str,
    pub text: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<&'static str>,
    pub kind: AnswerKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<&'static str>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
}

impl QuestionView {
    /// Static view with fixed options only; keyed options depend on answers
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id,
            section: question.section,
            text: question.text,
            help: question.help,
            kind: question.kind,
            options: question.options.resolve(None),
            required: question.required,
            answer: None,
        }
    }
}

impl From<ApplicableQuestion<'_>> for QuestionView {
    fn from(applicable: ApplicableQuestion<'_>) -> Self {
        let question = applicable.question;
        Self {
            id: question.id,
            section: question.section,
            text: question.text,
            help: question.help,
            kind: question.kind,
            options: applicable.options,
            required: question.required,
            answer: applicable.answer.cloned(),
        }
    }
}

/// Everything a client needs to render a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub questionnaire: QuestionnaireVariant,
    pub prompt: PromptVariant,
    pub state: SubmitState,
    pub answers: AnswerSet,
    pub applicable: Vec<QuestionView>,
    pub missing: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}
