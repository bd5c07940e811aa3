//! Daily scripture devotional.
//!
//! A theme is drawn from fixed weights nudged by the day of the week, one or
//! two scripture references are drawn for it, and a chat model writes the
//! devotional. At most one document is kept per local calendar day.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Weekday};
use chrono_tz::Tz;
use gn_core::config::{now_in, DevotionalConfig};
use gn_core::{ChatMessage, ChatModel, ChatRequest, DailyStore, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

pub const FAMILY: &str = "Family Responsibility and Care";
pub const TIME: &str = "Time Management and Wisdom";
pub const WORK: &str = "AI/Work Anxiety and Trust";
pub const GRATITUDE: &str = "Gratitude and Hope";
pub const CHILDREN: &str = "Children's Education/Prayer for Children";
pub const MORNING: &str = "Morning Seeking and Quietness";

pub const THEME_WEIGHTS: [(&str, f64); 6] = [
    (FAMILY, 1.2),
    (TIME, 1.2),
    (WORK, 1.3),
    (GRATITUDE, 1.1),
    (CHILDREN, 1.1),
    (MORNING, 1.2),
];

pub const THEME_MAP: [(&str, &[&str]); 6] = [
    (MORNING, &["Psalm 63:1-8", "Psalm 62:1-2,5-8"]),
    (
        WORK,
        &["Psalm 46", "Psalm 37:3-7", "Matthew 6:25-34", "Philippians 4:6-8"],
    ),
    (TIME, &["Psalm 90:12", "Proverbs 3:5-6", "James 1:5"]),
    (GRATITUDE, &["Psalm 103:1-5", "Isaiah 40:28-31"]),
    (FAMILY, &["Psalm 91", "Psalm 121", "Psalm 23"]),
    (CHILDREN, &["Psalm 121", "Proverbs 3:5-6"]),
];

pub const FALLBACK_SCRIPTURE: &str = "Psalm 23";
pub const DEVOTIONAL_TITLE: &str = "Daily Scripture and Devotion";

const TWO_PASSAGE_PROBABILITY: f64 = 0.35;
const SYSTEM_PROMPT: &str = "You are a wise and compassionate theologian and pastor.";

/// Multipliers applied on `weekday`.
pub fn weekday_bias(weekday: Weekday) -> Vec<(&'static str, f64)> {
    let mut bias = match weekday {
        Weekday::Sat | Weekday::Sun => vec![(FAMILY, 1.15), (GRATITUDE, 1.1)],
        _ => vec![(WORK, 1.2), (TIME, 1.15)],
    };
    bias.push((MORNING, 1.1));
    bias
}

/// Theme weights after applying the weekday bias.
pub fn theme_weights(weekday: Weekday) -> Vec<(&'static str, f64)> {
    let bias = weekday_bias(weekday);
    THEME_WEIGHTS
        .iter()
        .map(|&(theme, weight)| {
            let factor = bias
                .iter()
                .find(|(t, _)| *t == theme)
                .map_or(1.0, |&(_, f)| f);
            (theme, weight * factor)
        })
        .collect()
}

pub fn pick_theme<R: Rng + ?Sized>(rng: &mut R, weekday: Weekday) -> &'static str {
    let weights = theme_weights(weekday);
    match WeightedIndex::new(weights.iter().map(|&(_, w)| w)) {
        Ok(dist) => weights[dist.sample(rng)].0,
        Err(_) => MORNING,
    }
}

pub fn scriptures_for(theme: &str) -> &'static [&'static str] {
    THEME_MAP
        .iter()
        .find(|(t, _)| *t == theme)
        .map(|&(_, refs)| refs)
        .unwrap_or(&[])
}

/// One reference, or two distinct ones some of the time when the theme offers
/// more than one.
pub fn pick_scriptures<R: Rng + ?Sized>(rng: &mut R, theme: &str) -> Vec<String> {
    let candidates = scriptures_for(theme);
    if candidates.is_empty() {
        return vec![FALLBACK_SCRIPTURE.to_string()];
    }
    let count = if candidates.len() > 1 && rng.gen_bool(TWO_PASSAGE_PROBABILITY) {
        2
    } else {
        1
    };
    candidates
        .choose_multiple(rng, count)
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevotionalPlan {
    pub theme: String,
    pub scriptures: Vec<String>,
}

impl DevotionalPlan {
    pub fn choose<R: Rng + ?Sized>(rng: &mut R, weekday: Weekday) -> Self {
        let theme = pick_theme(rng, weekday);
        Self {
            theme: theme.to_string(),
            scriptures: pick_scriptures(rng, theme),
        }
    }

    fn references(&self) -> String {
        self.scriptures.join(", ")
    }
}

pub fn build_devotional_messages(plan: &DevotionalPlan, date: NaiveDate) -> Vec<ChatMessage> {
    let prompt = format!(
        "You are a wise and compassionate Chinese theologian and pastor.
Generate a daily devotional in Markdown format, all the text must using Simplified Chinese.

Today's Date: {date}
Theme: {theme}
Scripture References: {refs}

Please provide the following sections in your response:
1.  **Full Scripture Text**: Provide the full text for the scripture reference(s) above. Use a well-regarded English translation (like NIV or ESV).
2.  **Interpretation**: Explain the meaning and context of these verses. What is the main message?
3.  **Application**: How can I apply this to my daily life? Make it practical and connect it to the theme of '{theme}'.
4.  **Prayer**: Write a short, heartfelt prayer based on the scripture and application.

Structure the output clearly with Markdown headings.
",
        date = date.format("%Y-%m-%d"),
        theme = plan.theme,
        refs = plan.references(),
    );
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}

/// Body written in place of the devotional when the model call fails.
pub fn error_body(plan: &DevotionalPlan) -> String {
    format!(
        "**Error**: Could not generate devotional content due to an API error.\n\n**Theme**: {}\n**Scriptures**: {}",
        plan.theme,
        plan.references()
    )
}

pub fn render_devotional(body: &str, generated_at: &DateTime<Tz>) -> String {
    format!(
        "# {} · {}\n\n{}\n\n_Generated on: {}_\n",
        DEVOTIONAL_TITLE,
        generated_at.format("%Y-%m-%d"),
        body,
        generated_at.format("%Y-%m-%d %H:%M %Z")
    )
}

#[derive(Debug, Clone)]
pub struct Devotional {
    pub plan: DevotionalPlan,
    pub report: String,
    pub generated_at: DateTime<Tz>,
    pub output_path: PathBuf,
    pub written: bool,
}

#[derive(Debug, Clone)]
pub enum DevotionalOutcome {
    /// A document for the day was already present; nothing was generated.
    AlreadyExists(PathBuf),
    Generated(Devotional),
}

pub struct DevotionalService {
    config: DevotionalConfig,
    model: Arc<dyn ChatModel>,
    store: Arc<dyn DailyStore>,
}

impl DevotionalService {
    pub fn new(config: DevotionalConfig, model: Arc<dyn ChatModel>, store: Arc<dyn DailyStore>) -> Self {
        Self { config, model, store }
    }

    pub async fn generate(&self, now: Option<DateTime<Tz>>, write: bool) -> Result<DevotionalOutcome> {
        let generated_at = now.unwrap_or_else(|| now_in(self.config.tz()));
        let plan = DevotionalPlan::choose(&mut rand::thread_rng(), generated_at.weekday());
        self.generate_at(plan, generated_at, write).await
    }

    /// Like [`generate`](Self::generate) with a fixed theme and scriptures.
    pub async fn generate_with_plan(
        &self,
        plan: DevotionalPlan,
        now: Option<DateTime<Tz>>,
        write: bool,
    ) -> Result<DevotionalOutcome> {
        let generated_at = now.unwrap_or_else(|| now_in(self.config.tz()));
        self.generate_at(plan, generated_at, write).await
    }

    /// The weekday bias, the file date and the timestamp all come from
    /// `generated_at`.
    async fn generate_at(
        &self,
        plan: DevotionalPlan,
        generated_at: DateTime<Tz>,
        write: bool,
    ) -> Result<DevotionalOutcome> {
        let date = generated_at.date_naive();
        let output_path = self.store.path_for(date);

        if self.store.exists(date).await? {
            info!("⏭️ {} already exists. Skip writing.", output_path.display());
            return Ok(DevotionalOutcome::AlreadyExists(output_path));
        }

        info!(
            "📖 Generating devotional for {} with theme '{}' and scriptures '{}'",
            date,
            plan.theme,
            plan.references()
        );
        let request = ChatRequest::new(&self.config.model, build_devotional_messages(&plan, date))
            .temperature(0.7)
            .max_tokens(1024);
        let body = match self.model.complete(request).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Devotional generation failed: {}", e);
                error_body(&plan)
            }
        };

        let report = render_devotional(&body, &generated_at);
        let written = if write {
            self.store.write_if_absent(date, &report).await?
        } else {
            false
        };
        if written {
            info!("💾 Wrote devotional to {}", output_path.display());
        }

        Ok(DevotionalOutcome::Generated(Devotional {
            plan,
            report,
            generated_at,
            output_path,
            written,
        }))
    }
}
