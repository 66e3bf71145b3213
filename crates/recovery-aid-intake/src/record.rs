use serde::Serialize;

use crate::answer::Answer;
use crate::question::QuestionId;

/// One answered (or defaulted) question in an intake record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordEntry {
    pub question: QuestionId,
    pub answer: Answer,
    /// True when the value is a skip default rather than a user answer
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub defaulted: bool,
}

/// The frozen answers of a submitted questionnaire.
///
/// Entries follow questionnaire order. Only [`crate::Questionnaire::submit`]
/// builds one, so every applicable question is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeRecord {
    entries: Vec<RecordEntry>,
}

impl IntakeRecord {
    pub(crate) fn new(entries: Vec<RecordEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, question: &str) -> Option<&Answer> {
        self.entries
            .iter()
            .find(|e| e.question == question)
            .map(|e| &e.answer)
    }

    /// The prompt rendering of a field, or an empty string when the
    /// question was not part of this record.
    pub fn field(&self, question: &str) -> String {
        self.get(question)
            .map(Answer::to_prompt_string)
            .unwrap_or_default()
    }

    pub fn contains(&self, question: &str) -> bool {
        self.get(question).is_some()
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
