//! Comfort replies grounded in scripture or philosophy.
//!
//! All three profiles share one request shape and one call path; they differ
//! in the prompts sent and in how the JSON reply is normalized.

use std::sync::Arc;

use gn_core::{ChatMessage, ChatModel, ChatRequest, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_COMFORT_MODEL: &str = "gpt-4o-mini";
pub const MAX_PASSAGES: i64 = 10;

const GENTLE_SYSTEM_PROMPT: &str = "You are a gentle Christian pastoral counselor and Bible study helper.
You MUST respond STRICTLY in the user's requested language (zh for Chinese, en for English).
DO NOT mix languages. All output, including Bible references, must be in the selected language.
Propose Bible passages (book chapter:verse), fitting the user's situation.
For quotes: provide at most a very short paraphrase (<= 20 words/chars) or leave empty.
Write a longer pastoral devotional (300-500 zh characters / 300-400 English words) and a prayer (4-8 sentences).
Begin the devotional with 1-2 empathetic sentences acknowledging the user's feelings and situation before offering guidance.
Use validating, non-judgmental, warm language; avoid clichés and platitudes.
Avoid doctrinal disputes, be comforting and practical.
Return STRICT JSON only, matching the schema the user supplies.
If unsure about an exact verse, choose one you are confident in.
Do NOT include long verbatim quotes from copyrighted translations.
";

const BIBLE_SYSTEM_PROMPT: &str = "You are a Christian pastoral counselor and Bible study assistant serving a Christian audience.
You MUST respond STRICTLY in the user's requested language (zh for Chinese, en for English).
DO NOT mix languages. All output, including Bible references, must be in the selected language.

Tone and style (professional, Scripture-centered):
- Use respectful, clear, pastoral language with a measured, professional tone.
- Ground counsel in Scripture and historic Christian understanding; avoid interfaith syncretism.
- Lead with empathy without over-emphasizing therapeutic language; avoid clichés and platitudes.
- Be concise and structured; avoid debates and speculative theology.

Verse accuracy requirements:
- Ensure every reference (book name, chapter:verse range) is accurate and commonly recognized in the requested language.
- Use localized book names (Chinese for zh, English for en).
- Provide full_passage_text verbatim from a public-domain translation: WEB for English, CUV for Chinese.
- Do NOT paraphrase in full_passage_text; ensure it matches the cited reference precisely.
- If unsure about a verse, choose a different passage you are confident is correct. Never invent verses or numbers.

Content requirements:
- Propose Bible passages (book chapter:verse) that fit the user's situation.
- For short_quote: give at most a very brief paraphrase (<= 20 words/chars) or leave empty.
- Write a pastoral devotional (300-500 zh characters / 300-500 English words) with a professional tone for Christians.
- Begin the devotional with 1-2 empathetic sentences, then provide Scripture-based reflection and one concise practical application or reflection question.
- Write a reverent, concise prayer (4-8 sentences).
- Avoid heavy emphasis on therapeutic techniques; keep the focus on biblical encouragement and practical wisdom.

Output rules:
- Return STRICT JSON only, matching the schema the user supplies.
- Use only the requested language for all content and references.
- Do NOT include long verbatim quotes from copyrighted translations (only WEB/CUV for full_passage_text).
";

const PHILOSOPHY_SYSTEM_PROMPT: &str = "You are a calm, pluralistic philosophical counselor who draws from a wide range of philosophers (e.g., Aristotle, Epicurus, Stoics like Marcus Aurelius/Epictetus/Seneca, Confucius, Montaigne, Descartes, Spinoza, Hume, Kant, Schopenhauer, Nietzsche, Kierkegaard, Camus, Sartre) and from 'The Consolations of Philosophy' by Alain de Botton.
You MUST respond STRICTLY in the user's requested language (zh for Chinese, en for English) and DO NOT mix languages.
Tone and style: be warm, gently healing, and non-judgmental; validate feelings with care; avoid lecturing or preaching; avoid \"should/must\"; prefer soft invitations like \"you might try\", \"consider\", \"if it helps\"; keep sentences clear and not too long; use plain, compassionate wording.
Healing emphasis: prioritize relief, steadiness, and hope; translate philosophical ideas into everyday language; favor self-compassion, present-moment grounding (breath, senses, posture), and small, achievable steps; if in doubt, choose the kinder phrasing.
Select the most relevant, high-leverage ideas to comfort and guide the user; combine multiple perspectives when helpful.
Explicitly draw on Philosophy of Well-Being and practical wisdom aimed at living a happier life; name relevant concepts (eudaimonia, ataraxia, flourishing, virtue ethics, meaning, etc.).
For copyrighted works (including modern books): prefer concise paraphrases rather than long verbatim quotes. For public-domain works, you may include short snippets but keep them brief (<= 20 words/chars).
Write a practical, compassionate, and healing-toned philosophical reflection. Begin with 1-2 sentences of empathy and normalization. Include at least one gentle reframe and one brief grounding cue (e.g., \"notice your feet on the floor\").
Provide a short step-by-step philosophical exercise (4-8 sentences) written as a gentle invitation, not a command. Make it easy to try (2-5 minutes), with optional steps. Close with one reassuring sentence.
Avoid sectarian or religious framing; focus on agency, clarity, and emotional steadiness.
Return STRICT JSON only, matching exactly the schema the user supplies.
If unsure about exact sections, choose ones you are confident in and clearly name the work and section (e.g., \"Meditations 2.1\", \"Nicomachean Ethics II\").
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComfortProfile {
    /// Warm pastoral counsel with Bible passages.
    Gentle,
    /// Scripture-centred counsel with verbatim public-domain passages.
    Bible,
    Philosophy,
}

impl ComfortProfile {
    fn system_prompt(self) -> &'static str {
        match self {
            ComfortProfile::Gentle => GENTLE_SYSTEM_PROMPT,
            ComfortProfile::Bible => BIBLE_SYSTEM_PROMPT,
            ComfortProfile::Philosophy => PHILOSOPHY_SYSTEM_PROMPT,
        }
    }

    fn default_background(self) -> &'static str {
        match self {
            ComfortProfile::Gentle | ComfortProfile::Bible => "christian",
            ComfortProfile::Philosophy => "philosophy",
        }
    }
}

fn default_language() -> String {
    "zh".to_string()
}

fn default_max_passages() -> i64 {
    3
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComfortQuery {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub situation: String,
    #[serde(default, alias = "faith_background", alias = "philosophy_background")]
    pub background: Option<String>,
    #[serde(default = "default_max_passages")]
    pub max_passages: i64,
    #[serde(default)]
    pub guidance: Option<String>,
}

impl ComfortQuery {
    pub fn new(situation: impl Into<String>) -> Self {
        Self {
            language: default_language(),
            situation: situation.into(),
            background: None,
            max_passages: default_max_passages(),
            guidance: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_max_passages(mut self, max_passages: i64) -> Self {
        self.max_passages = max_passages;
        self
    }

    fn is_chinese(&self) -> bool {
        self.language.starts_with("zh")
    }

    fn length_unit(&self) -> &'static str {
        if self.is_chinese() {
            "characters"
        } else {
            "words"
        }
    }

    /// Requested passage count clamped to `1..=10`.
    pub fn passage_limit(&self) -> usize {
        self.max_passages.clamp(1, MAX_PASSAGES) as usize
    }

    fn guidance(&self) -> &str {
        self.guidance
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .unwrap_or("None")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    #[serde(rename = "ref")]
    pub reference: String,
    pub short_quote: String,
    pub reason: String,
    pub full_passage_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptureComfort {
    pub passages: Vec<Passage>,
    pub devotional: String,
    pub prayer: String,
    pub disclaimer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhilosophyComfort {
    pub reflection: String,
    pub exercise: String,
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ComfortReply {
    Scripture(ScriptureComfort),
    Philosophy(PhilosophyComfort),
}

// Raw model output; any field may be absent or null.
#[derive(Deserialize)]
struct RawPassage {
    #[serde(rename = "ref")]
    reference: Option<String>,
    short_quote: Option<String>,
    reason: Option<String>,
    full_passage_text: Option<String>,
}

#[derive(Deserialize)]
struct RawScripture {
    passages: Option<Vec<RawPassage>>,
    devotional: Option<String>,
    prayer: Option<String>,
    disclaimer: Option<String>,
}

#[derive(Deserialize)]
struct RawPhilosophy {
    reflection: Option<String>,
    exercise: Option<String>,
    disclaimer: Option<String>,
}

fn scripture_disclaimer(query: &ComfortQuery) -> &'static str {
    if query.is_chinese() {
        "请在你常用的圣经译本中核对经文原文与上下文；以上解读仅作灵修参考。"
    } else {
        "Please verify these references in your preferred Bible translation; the reflection is for devotional support."
    }
}

fn philosophy_disclaimer(query: &ComfortQuery) -> &'static str {
    if query.is_chinese() {
        "不同版本或译本的表述可能有所不同，请自行核对出处；以上内容仅作支持性参考。"
    } else {
        "Please verify sources in your preferred edition/translation; non-public-domain texts are summarized, and this is supportive guidance only."
    }
}

fn or_default(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// A quote longer than 40 characters (Chinese) or 20 words (other
/// languages) is dropped.
fn short_quote(quote: Option<String>, query: &ComfortQuery) -> String {
    let quote = quote.unwrap_or_default().trim().to_string();
    let too_long = if query.is_chinese() {
        quote.chars().count() > 40
    } else {
        quote.split_whitespace().count() > 20
    };
    if too_long {
        String::new()
    } else {
        quote
    }
}

/// Builds the system and user messages for `profile`.
pub fn build_messages(profile: ComfortProfile, query: &ComfortQuery) -> Vec<ChatMessage> {
    let background = query
        .background
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .unwrap_or(profile.default_background());

    let user_prompt = match profile {
        ComfortProfile::Gentle | ComfortProfile::Bible => format!(
            "User language: {language}
Faith background: {background}
Situation detail: {situation}
Additional guidance: {guidance}

Return JSON with fields:
- passages: array of at most {max_passages} objects with fields:
  - ref (string, e.g., \"Psalm 46:1-3\" or localized equivalent)
  - short_quote (string, <= 20 words/chars; a paraphrase or public-domain-short snippet; MAY be empty)
  - reason (string, 1-2 sentences why this fits)
  - full_passage_text (string, the full text of the passage from a public domain version. Use WEB (World English Bible) if user language is English, use CUV (Chinese Union Version) if user language is Chinese)
- devotional: a 300-500 {unit} pastoral reflection applying these passages to the user's situation. Begin with 1-2 empathetic sentences acknowledging the user's feelings and context before offering guidance.
- prayer: 4-8 sentences prayer.
- disclaimer: one sentence kindly asking the user to verify in their preferred translation.

Use the requested language for everything.
",
            language = query.language,
            background = background,
            situation = query.situation,
            guidance = query.guidance(),
            max_passages = query.passage_limit(),
            unit = query.length_unit(),
        ),
        ComfortProfile::Philosophy => format!(
            "User language: {language}
Philosophical background: {background}
Situation detail: {situation}
Additional guidance: {guidance}

Return JSON with fields:
- reflection: a 500-700 {unit} philosophical reflection tailored to the user's situation; open with empathy and normalization; keep a warm, soothing, and healing tone; avoid lecturing; include one gentle reframe and one tiny grounding cue.
- exercise: 4-8 sentences describing a gentle, invitation-style practice that can be done in 2-5 minutes; mark steps as optional where helpful; include a brief sensory step and end with one sentence of reassurance.
- disclaimer: one concise sentence reminding the user that summaries may differ by edition/translation and encouraging verification.

Use the requested language for everything.
",
            language = query.language,
            background = background,
            situation = query.situation,
            guidance = query.guidance(),
            unit = query.length_unit(),
        ),
    };

    vec![
        ChatMessage::system(profile.system_prompt()),
        ChatMessage::user(user_prompt),
    ]
}

/// Normalizes the JSON text returned by the model for `profile`.
pub fn parse_reply(profile: ComfortProfile, query: &ComfortQuery, content: &str) -> Result<ComfortReply> {
    if content.trim().is_empty() {
        return Err(Error::Inference("LLM returned empty content".to_string()));
    }
    let invalid = |e: serde_json::Error| Error::Inference(format!("LLM returned invalid JSON: {}", e));

    match profile {
        ComfortProfile::Gentle | ComfortProfile::Bible => {
            let raw: RawScripture = serde_json::from_str(content).map_err(invalid)?;
            let passages = raw
                .passages
                .unwrap_or_default()
                .into_iter()
                .take(query.passage_limit())
                .map(|p| Passage {
                    reference: p.reference.unwrap_or_default(),
                    short_quote: short_quote(p.short_quote, query),
                    reason: p.reason.unwrap_or_default(),
                    full_passage_text: p.full_passage_text.unwrap_or_default(),
                })
                .collect();
            Ok(ComfortReply::Scripture(ScriptureComfort {
                passages,
                devotional: raw.devotional.unwrap_or_default(),
                prayer: raw.prayer.unwrap_or_default(),
                disclaimer: or_default(raw.disclaimer, scripture_disclaimer(query)),
            }))
        }
        ComfortProfile::Philosophy => {
            let raw: RawPhilosophy = serde_json::from_str(content).map_err(invalid)?;
            Ok(ComfortReply::Philosophy(PhilosophyComfort {
                reflection: raw.reflection.unwrap_or_default(),
                exercise: raw.exercise.unwrap_or_default(),
                disclaimer: or_default(raw.disclaimer, philosophy_disclaimer(query)),
            }))
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComfortService {
    model: Arc<dyn ChatModel>,
    model_name: String,
}

impl ComfortService {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            model_name: DEFAULT_COMFORT_MODEL.to_string(),
        }
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub async fn comfort(&self, profile: ComfortProfile, query: &ComfortQuery) -> Result<ComfortReply> {
        if query.situation.trim().is_empty() {
            return Err(Error::InvalidRequest("situation must not be empty".to_string()));
        }

        let request = ChatRequest::new(&self.model_name, build_messages(profile, query)).json();
        debug!("Requesting {:?} comfort in {}", profile, query.language);
        let content = self.model.complete(request).await?;
        parse_reply(profile, query, &content)
    }
}
