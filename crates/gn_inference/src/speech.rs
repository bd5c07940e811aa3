use std::sync::Arc;

use gn_core::{Error, Result, SpeechModel, SpeechRequest};
use serde::Deserialize;
use tracing::debug;

pub const TTS_MODEL: &str = "gpt-4o-mini-tts";
pub const DEFAULT_VOICE: &str = "fable";
pub const MAX_TTS_CHARS: usize = 6000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    /// `wav` (any case) selects WAV; everything else is MP3.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("wav") => AudioFormat::Wav,
            _ => AudioFormat::Mp3,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SpeechQuery {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl SpeechQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

impl Audio {
    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }
}

/// The requested voice, or the default when none was given.
pub fn select_voice(requested: Option<&str>) -> String {
    requested
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_VOICE)
        .to_string()
}

/// Trims the text and caps it at [`MAX_TTS_CHARS`] characters.
pub fn prepare_text(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::InvalidRequest("Missing text for TTS".to_string()));
    }
    Ok(text.chars().take(MAX_TTS_CHARS).collect())
}

#[derive(Debug, Clone)]
pub struct SpeechService {
    model: Arc<dyn SpeechModel>,
}

impl SpeechService {
    pub fn new(model: Arc<dyn SpeechModel>) -> Self {
        Self { model }
    }

    pub async fn synthesize(&self, query: &SpeechQuery) -> Result<Audio> {
        let input = prepare_text(&query.text)?;
        let format = AudioFormat::parse(query.format.as_deref());
        let request = SpeechRequest {
            model: TTS_MODEL.to_string(),
            voice: select_voice(query.voice.as_deref()),
            input,
            format: format.extension().to_string(),
        };

        debug!(
            "Synthesizing {} chars with voice {} ({})",
            request.input.chars().count(),
            request.voice,
            format.extension()
        );
        let bytes = self.model.synthesize(request).await?;
        Ok(Audio { bytes, format })
    }
}
