use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single answer value.
///
/// Single-choice and free-text answers are both plain text; the question
/// kind decides how the text is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Free-form text or a single selected option
    Text(String),
    /// Multiple selected options
    Selections(Vec<String>),
    /// A point on a numeric scale
    Scale(i64),
}

impl Answer {
    pub fn text(s: impl Into<String>) -> Self {
        Answer::Text(s.into())
    }

    pub fn selections<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Answer::Selections(values.into_iter().map(Into::into).collect())
    }

    pub fn scale(value: i64) -> Self {
        Answer::Scale(value)
    }

    /// Render the answer the way it is interpolated into a prompt
    pub fn to_prompt_string(&self) -> String {
        match self {
            Answer::Text(s) => s.clone(),
            Answer::Selections(v) => v.join(", "),
            Answer::Scale(n) => n.to_string(),
        }
    }

    /// Whether the answer carries no content (blank text, no selections)
    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Text(s) => s.trim().is_empty(),
            Answer::Selections(v) => v.is_empty(),
            Answer::Scale(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn includes(&self, value: &str) -> bool {
        match self {
            Answer::Selections(v) => v.iter().any(|s| s == value),
            _ => false,
        }
    }
}

/// The answers given so far in one session, keyed by question id.
///
/// Answers to questions that are no longer applicable are kept (the user
/// may switch back), but the engine ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, Answer>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question: &str) -> Option<&Answer> {
        self.0.get(question)
    }

    /// Store an answer without validation.
    ///
    /// Prefer [`crate::Questionnaire::record_answer`], which checks the
    /// answer against the question first.
    pub fn insert(&mut self, question: impl Into<String>, answer: Answer) -> Option<Answer> {
        self.0.insert(question.into(), answer)
    }

    pub fn remove(&mut self, question: &str) -> Option<Answer> {
        self.0.remove(question)
    }

    pub fn contains(&self, question: &str) -> bool {
        self.0.contains_key(question)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Answer)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, Answer)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (K, Answer)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
