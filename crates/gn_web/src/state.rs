use gn_core::{Error, Result};
use gn_inference::{create_model, ComfortService, ModelHandles, SpeechService};
use tracing::warn;

/// Services shared by the handlers. When no model could be configured the
/// server still starts and every model-backed request reports why.
#[derive(Debug, Clone)]
pub struct AppState {
    models: std::result::Result<ModelHandles, String>,
}

impl AppState {
    pub fn new(models: ModelHandles) -> Self {
        Self { models: Ok(models) }
    }

    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            models: Err(reason.into()),
        }
    }

    /// Builds the named provider, keeping a configuration failure for later.
    pub fn from_provider(name: &str) -> Result<Self> {
        match create_model(name) {
            Ok(models) => Ok(Self::new(models)),
            Err(Error::Configuration(reason)) => {
                warn!("⚠️ {}; model endpoints will answer with this error", reason);
                Ok(Self::unconfigured(reason))
            }
            Err(e) => Err(e),
        }
    }

    fn models(&self) -> Result<&ModelHandles> {
        self.models
            .as_ref()
            .map_err(|reason| Error::Configuration(reason.clone()))
    }

    pub fn comfort(&self) -> Result<ComfortService> {
        Ok(ComfortService::new(self.models()?.chat.clone()))
    }

    pub fn speech(&self) -> Result<SpeechService> {
        Ok(SpeechService::new(self.models()?.speech.clone()))
    }
}
