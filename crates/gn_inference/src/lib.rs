pub mod comfort;
pub mod devotional;
pub mod models;
pub mod speech;
pub mod summarizer;

pub use comfort::{ComfortProfile, ComfortQuery, ComfortReply, ComfortService};
pub use devotional::{DevotionalOutcome, DevotionalPlan, DevotionalService};
pub use models::{create_model, DummyModel, ModelHandles, OpenAiClient};
pub use speech::{Audio, AudioFormat, SpeechQuery, SpeechService};
pub use summarizer::GoodNewsSummarizer;

pub mod prelude {
    pub use super::comfort::{ComfortProfile, ComfortQuery, ComfortReply, ComfortService};
    pub use super::models::create_model;
    pub use super::speech::{SpeechQuery, SpeechService};
    pub use gn_core::{Error, Result};
}
