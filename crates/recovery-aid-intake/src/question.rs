use serde::Serialize;

pub type QuestionId = &'static str;

/// The kind of answer a question expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerKind {
    /// Exactly one option
    SingleChoice,
    /// Any number of options
    MultiChoice,
    /// Free-form text
    FreeText { multiline: bool },
    /// Integer in `min..=max`; `default` is what a form pre-fills
    Scale { min: i64, max: i64, default: i64 },
}

/// A set of answer values and the options they unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionGroup {
    pub members: &'static [&'static str],
    pub options: &'static [&'static str],
}

/// Where a choice question gets its options from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionSource {
    /// Text and scale questions
    None,
    Fixed {
        options: &'static [&'static str],
    },
    /// Options picked by which group the answer to `on` belongs to.
    /// No matching group yields an empty option list.
    Keyed {
        on: QuestionId,
        groups: &'static [OptionGroup],
    },
}

impl OptionSource {
    /// Resolve the options given the current answer to the keyed question
    pub fn resolve(&self, keyed_answer: Option<&str>) -> Vec<&'static str> {
        match self {
            OptionSource::None => Vec::new(),
            OptionSource::Fixed { options } => options.to_vec(),
            OptionSource::Keyed { groups, .. } => keyed_answer
                .and_then(|value| groups.iter().find(|g| g.members.iter().any(|m| *m == value)))
                .map(|g| g.options.to_vec())
                .unwrap_or_default(),
        }
    }

    pub fn key(&self) -> Option<QuestionId> {
        match self {
            OptionSource::Keyed { on, .. } => Some(*on),
            _ => None,
        }
    }
}

/// Rule deciding whether a question is shown and required.
///
/// Rules may only reference questions earlier in the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Applicability {
    Always,
    /// The earlier single-choice answer equals `value`
    AnswerIs {
        question: QuestionId,
        value: &'static str,
    },
    /// The earlier multi-choice answer contains `value`
    AnswerIncludes {
        question: QuestionId,
        value: &'static str,
    },
    /// The question's resolved option list is non-empty
    HasOptions,
}

impl Applicability {
    pub fn references(&self) -> Option<QuestionId> {
        match self {
            Applicability::AnswerIs { question, .. }
            | Applicability::AnswerIncludes { question, .. } => Some(*question),
            Applicability::Always | Applicability::HasOptions => None,
        }
    }
}

/// A single question in a questionnaire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    /// Heading of the form step this question belongs to
    pub section: &'static str,
    pub text: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<&'static str>,
    pub kind: AnswerKind,
    #[serde(skip)]
    pub options: OptionSource,
    pub applicability: Applicability,
    pub required: bool,
    /// Value recorded when the question is skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_default: Option<&'static str>,
}

impl Question {
    fn new(id: QuestionId, section: &'static str, text: &'static str, kind: AnswerKind) -> Self {
        Self {
            id,
            section,
            text,
            help: None,
            kind,
            options: OptionSource::None,
            applicability: Applicability::Always,
            required: true,
            skip_default: None,
        }
    }

    pub fn single_choice(
        id: QuestionId,
        section: &'static str,
        text: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            options: OptionSource::Fixed { options },
            ..Self::new(id, section, text, AnswerKind::SingleChoice)
        }
    }

    pub fn multi_choice(
        id: QuestionId,
        section: &'static str,
        text: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            options: OptionSource::Fixed { options },
            ..Self::new(id, section, text, AnswerKind::MultiChoice)
        }
    }

    pub fn text(id: QuestionId, section: &'static str, text: &'static str) -> Self {
        Self::new(id, section, text, AnswerKind::FreeText { multiline: false })
    }

    pub fn text_area(id: QuestionId, section: &'static str, text: &'static str) -> Self {
        Self::new(id, section, text, AnswerKind::FreeText { multiline: true })
    }

    pub fn scale(
        id: QuestionId,
        section: &'static str,
        text: &'static str,
        min: i64,
        max: i64,
        default: i64,
    ) -> Self {
        Self::new(id, section, text, AnswerKind::Scale { min, max, default })
    }

    /// Replace the fixed options with options keyed on an earlier answer.
    /// The question is only shown when the key unlocks some options.
    pub fn keyed_on(mut self, on: QuestionId, groups: &'static [OptionGroup]) -> Self {
        self.options = OptionSource::Keyed { on, groups };
        self.applicability = Applicability::HasOptions;
        self
    }

    pub fn when_answer_is(mut self, question: QuestionId, value: &'static str) -> Self {
        self.applicability = Applicability::AnswerIs { question, value };
        self
    }

    pub fn when_answer_includes(mut self, question: QuestionId, value: &'static str) -> Self {
        self.applicability = Applicability::AnswerIncludes { question, value };
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn default_when_skipped(mut self, value: &'static str) -> Self {
        self.skip_default = Some(value);
        self
    }

    pub fn is_choice(&self) -> bool {
        matches!(
            self.kind,
            AnswerKind::SingleChoice | AnswerKind::MultiChoice
        )
    }
}
