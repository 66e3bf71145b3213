use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::formatter::AdviceRequest;

/// Errors from the text-completion service
#[derive(Error, Debug)]
pub enum AdviceError {
    #[error("Error communicating with the advice service: {0}")]
    Transport(String),

    #[error("Advice service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response from the advice service: {0}")]
    MalformedResponse(String),
}

/// The service cannot be used at all in this process
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{var} is not set; advice requests are disabled")]
    MissingCredential { var: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Text returned by the service, shown to the user verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdviceResponse {
    pub text: String,
}

/// A text-completion backend
#[async_trait]
pub trait AdviceService: Send + Sync {
    /// Human-readable name of the service
    fn name(&self) -> &str;

    /// Send one request. No retries.
    async fn request_advice(&self, request: &AdviceRequest) -> Result<AdviceResponse, AdviceError>;
}
