use std::sync::Arc;

use gn_core::{ChatModel, Error, Result, SpeechModel};

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAiClient;

/// A chat model paired with the speech model from the same provider.
#[derive(Debug, Clone)]
pub struct ModelHandles {
    pub chat: Arc<dyn ChatModel>,
    pub speech: Arc<dyn SpeechModel>,
}

/// Builds the named provider: `openai` (credentials from the environment) or
/// `dummy` (offline).
pub fn create_model(name: &str) -> Result<ModelHandles> {
    match name {
        "openai" => {
            let client = Arc::new(OpenAiClient::from_env()?);
            Ok(ModelHandles {
                chat: client.clone(),
                speech: client,
            })
        }
        "dummy" => {
            let model = Arc::new(DummyModel::new());
            Ok(ModelHandles {
                chat: model.clone(),
                speech: model,
            })
        }
        other => Err(Error::Configuration(format!(
            "Unknown model provider: {} (expected openai or dummy)",
            other
        ))),
    }
}
