use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use gn_core::report::FALLBACK_SUMMARY;
use gn_core::{Article, ChatMessage, ChatModel, ChatRequest, NewsSummarizer, Result};
use tracing::debug;

pub const SUMMARY_TEMPERATURE: f32 = 0.45;
pub const SUMMARY_MAX_TOKENS: u32 = 1400;

const SYSTEM_PROMPT: &str = "You are an upbeat journalist who only writes truthful, uplifting reports in Simplified Chinese. Always ground your writing in the provided article content.";

fn excerpt(content: Option<&str>, limit: usize) -> String {
    match content {
        None | Some("") => "(no content fetched)".to_string(),
        Some(text) if text.chars().count() > limit => {
            let cut: String = text.chars().take(limit).collect();
            format!("{}...", cut)
        }
        Some(text) => text.to_string(),
    }
}

fn or_placeholder<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or(placeholder)
}

fn article_section(index: usize, article: &Article, excerpt_limit: usize) -> String {
    format!(
        "Article {}\nTitle: {}\nSource: {}\nAuthor: {}\nPublished: {}\nURL: {}\nSummary: {}\nFull Text Excerpt:\n{}",
        index,
        article.title,
        or_placeholder(&article.source, "(unknown source)"),
        or_placeholder(&article.author, "(unknown author)"),
        or_placeholder(&article.published_at, "(unknown time)"),
        or_placeholder(&article.url, "(no URL)"),
        or_placeholder(&article.description, "(no summary provided)"),
        excerpt(article.content.as_deref(), excerpt_limit),
    )
}

/// Builds the system and user prompts asking for a Simplified Chinese digest
/// with highlight, impact and encouragement sections.
pub fn build_summary_messages(
    articles: &[Article],
    extra_notes: &[String],
    date: NaiveDate,
    excerpt_limit: usize,
) -> Vec<ChatMessage> {
    let context = articles
        .iter()
        .enumerate()
        .map(|(i, article)| article_section(i + 1, article, excerpt_limit))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");
    let trailing = if extra_notes.is_empty() {
        "None".to_string()
    } else {
        extra_notes.join("\n")
    };

    let user_prompt = format!(
        "今天日期：{date}

以下提供了若干正面新闻的原文内容。请严格依据 Full Text Excerpt（若存在）撰写总结，如若全文不可用，可参考 Summary 或其他元数据。

要求：
- 全文使用简体中文撰写。
- 输出结构必须包含：
  ## 精选亮点
  - 针对每篇文章说明积极亮点，若有 URL 且可引用请使用 Markdown 链接。
  ## 正面影响
  - 至少 3 条要点，基于正文中的具体细节，解释这些新闻如何带来积极影响。
  ## 鼓励寄语
  - 以温暖的一句话鼓励读者。
- 请引用正文中的关键信息，不要虚构内容。若信息不足，请明确指出。
- 文字不少于 400 字。

文章内容：
{context}

额外说明：{trailing}
",
        date = date.format("%Y-%m-%d"),
        context = context,
        trailing = trailing,
    );

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)]
}

/// Summarizes enriched articles with a chat model.
#[derive(Debug, Clone)]
pub struct GoodNewsSummarizer {
    model: Arc<dyn ChatModel>,
    model_name: String,
    excerpt_limit: usize,
}

impl GoodNewsSummarizer {
    pub fn new(model: Arc<dyn ChatModel>, model_name: impl Into<String>, excerpt_limit: usize) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            excerpt_limit,
        }
    }
}

#[async_trait]
impl NewsSummarizer for GoodNewsSummarizer {
    async fn summarize(
        &self,
        articles: &[Article],
        extra_notes: &[String],
        generated_at: &DateTime<Tz>,
    ) -> Result<String> {
        if articles.is_empty() {
            return Ok(FALLBACK_SUMMARY.to_string());
        }

        let messages = build_summary_messages(
            articles,
            extra_notes,
            generated_at.date_naive(),
            self.excerpt_limit,
        );
        let request = ChatRequest::new(&self.model_name, messages)
            .temperature(SUMMARY_TEMPERATURE)
            .max_tokens(SUMMARY_MAX_TOKENS);

        debug!("Requesting summary from {} ({})", self.model.name(), self.model_name);
        let reply = self.model.complete(request).await?;
        Ok(reply.trim().to_string())
    }
}
