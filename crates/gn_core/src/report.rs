use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use crate::types::Article;

pub const REPORT_TITLE: &str = "好消息速递";
pub const SOURCES_HEADING: &str = "## 信息来源";
pub const NO_SOURCES: &str = "暂无可引用的文章链接。";
pub const GENERATED_ON: &str = "Generated on";

/// Summary used when no article survives to the summarizing step.
pub const FALLBACK_SUMMARY: &str = "## 精选亮点\n- 无法找到今日的正面新闻。\n\n## 正面影响\n- 期待明天会传来更好的消息。\n\n## 鼓励寄语\n继续保持希望，新的祝福就在路上。";

/// Renders the Markdown digest: dated title, summary, numbered sources,
/// extra notes and a generation timestamp.
pub fn build_report<Tz>(
    summary: &str,
    articles: &[Article],
    extra_notes: &[String],
    generated_at: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let date = generated_at.format("%Y-%m-%d");
    let mut lines = vec![
        format!("# {} · {}", REPORT_TITLE, date),
        String::new(),
        summary.trim().to_string(),
        String::new(),
        SOURCES_HEADING.to_string(),
    ];

    if articles.is_empty() {
        lines.push(NO_SOURCES.to_string());
    } else {
        lines.extend(
            articles
                .iter()
                .enumerate()
                .map(|(i, article)| source_line(i + 1, article)),
        );
    }

    if !extra_notes.is_empty() {
        lines.push(String::new());
        lines.extend(extra_notes.iter().cloned());
    }

    lines.push(String::new());
    lines.push(format!(
        "_{}: {}_",
        GENERATED_ON,
        generated_at.format("%Y-%m-%d %H:%M %Z")
    ));
    lines.push(String::new());

    lines.join("\n")
}

fn source_line(index: usize, article: &Article) -> String {
    let mut suffix = Vec::new();
    if let Some(source) = &article.source {
        suffix.push(source.clone());
    }
    if let Some(published) = &article.published_at {
        suffix.push(format!("({})", published));
    }
    let suffix = suffix.join(" ");

    let entry = match &article.url {
        Some(url) => format!("{}. [{}]({}) {}", index, article.title, url, suffix),
        None => format!("{}. {} {}", index, article.title, suffix),
    };
    entry.trim_end().to_string()
}
