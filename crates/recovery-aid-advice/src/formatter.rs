use recovery_aid_intake::IntakeRecord;
use serde::Serialize;

use crate::prompts::PromptVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The two-message prompt for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdviceRequest {
    pub prompt: PromptVariant,
    pub system: String,
    pub user: String,
}

impl AdviceRequest {
    /// System message first, then the rendered answers
    pub fn messages(&self) -> [ChatMessage; 2] {
        [
            ChatMessage {
                role: ChatRole::System,
                content: self.system.clone(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: self.user.clone(),
            },
        ]
    }
}

/// Renders intake records with a prompt variant fixed at construction
#[derive(Debug, Clone, Copy, Default)]
pub struct AdviceFormatter {
    prompt: PromptVariant,
}

impl AdviceFormatter {
    pub fn new(prompt: PromptVariant) -> Self {
        Self { prompt }
    }

    pub fn prompt(&self) -> PromptVariant {
        self.prompt
    }

    pub fn format(&self, record: &IntakeRecord) -> AdviceRequest {
        AdviceRequest {
            prompt: self.prompt,
            system: self.prompt.instructions().to_string(),
            user: self.prompt.render_user_message(record),
        }
    }
}
