//! # recovery-aid-advice
//!
//! Turns an [`IntakeRecord`](recovery_aid_intake::IntakeRecord) into a
//! two-message chat prompt and sends it to a text-completion service.
//!
//! ## Key Types
//!
//! - [`PromptVariant`] - Versioned instruction text plus user-message template
//! - [`AdviceFormatter`] - Deterministic record-to-request rendering
//! - [`AdviceService`] - The outbound call, implemented by [`OpenAiAdviceService`]

mod formatter;
mod openai;
mod prompts;
mod traits;

pub use formatter::{AdviceFormatter, AdviceRequest, ChatMessage, ChatRole};
pub use openai::{
    ApiKey, OpenAiAdviceService, ServiceConfig, API_KEY_ENV, DEFAULT_BASE_URL, MAX_TOKENS, MODEL,
    TEMPERATURE,
};
pub use prompts::{PromptVariant, BASELINE_INSTRUCTIONS, MOVEMENT_SCREEN_INSTRUCTIONS};
pub use traits::{AdviceError, AdviceResponse, AdviceService, ConfigurationError};
