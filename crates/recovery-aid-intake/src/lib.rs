//! # recovery-aid-intake
//!
//! The adaptive injury questionnaire.
//!
//! ## Key Types
//!
//! - [`Questionnaire`] - Static question set plus the applicability rules
//! - [`AnswerSet`] - The answers collected so far in one session
//! - [`IntakeRecord`] - Frozen projection of the applicable answers at submit time
//! - [`QuestionnaireVariant`] - The two built-in question sets
//!
//! Questions may only depend on answers to questions that come before them,
//! so [`Questionnaire::applicable_questions`] is a single forward pass.

mod answer;
mod catalog;
mod engine;
mod error;
mod question;
mod record;

pub use answer::{Answer, AnswerSet};
pub use catalog::{fields, values, QuestionnaireVariant};
pub use engine::{ApplicableQuestion, Questionnaire};
pub use error::IntakeError;
pub use question::{AnswerKind, Applicability, OptionGroup, OptionSource, Question, QuestionId};
pub use record::{IntakeRecord, RecordEntry};
