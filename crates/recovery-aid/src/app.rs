use std::sync::Arc;

use recovery_aid_advice::{ApiKey, OpenAiAdviceService, PromptVariant, ServiceConfig};
use recovery_aid_core::{IntakeSession, ServiceHandle};
use recovery_aid_intake::QuestionnaireVariant;
use recovery_aid_logging::{LogEvent, Logger};

use crate::config::Settings;

/// Process-wide state shared by every session
#[derive(Clone)]
pub struct AppContext {
    pub settings: Settings,
    pub service: ServiceHandle,
    pub logger: Arc<Logger>,
}

impl AppContext {
    /// Read the credential and build the advice client once.
    ///
    /// A missing credential is reported here and then carried by every
    /// session, so submissions fail while the form keeps working.
    pub fn new(settings: Settings, logger: Arc<Logger>) -> Self {
        let service = connect(&settings);
        if let Err(ref e) = service {
            logger.log(&LogEvent::ConfigurationMissing {
                message: e.to_string(),
            });
        }
        Self {
            settings,
            service,
            logger,
        }
    }

    #[cfg(test)]
    pub fn with_service(settings: Settings, service: ServiceHandle, logger: Arc<Logger>) -> Self {
        Self {
            settings,
            service,
            logger,
        }
    }

    /// Start a session, falling back to the configured variants
    pub fn new_session(
        &self,
        questionnaire: Option<QuestionnaireVariant>,
        prompt: Option<PromptVariant>,
    ) -> IntakeSession {
        IntakeSession::new(
            questionnaire.unwrap_or(self.settings.questionnaire),
            prompt.unwrap_or(self.settings.prompt),
            self.service.clone(),
            self.logger.clone(),
        )
    }
}

fn connect(settings: &Settings) -> ServiceHandle {
    let config = ServiceConfig::new(ApiKey::from_env()?)
        .with_base_url(settings.base_url.clone())
        .with_timeout(settings.timeout);
    Ok(Arc::new(OpenAiAdviceService::new(config)?))
}
