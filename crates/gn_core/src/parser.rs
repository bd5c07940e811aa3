//! Recovers [`Article`] records from the loosely structured text returned by
//! the search collaborator.
//!
//! Two layouts are understood:
//!
//! * blocks introduced by `Article N:` markers, each holding labelled lines
//!   (`Title:`, `Source:`, `Author:`, `Published:`, `Summary:` or
//!   `Description:`, `URL:`, `Full Text Excerpt:`);
//! * a numbered search listing (`N. Title`, then `URL:` and `Summary:` lines).
//!
//! Markers and labels are matched case-sensitively at the start of a line and only the
//! first occurrence of each label counts. Parsing never fails: segments that
//! carry neither a title nor a URL are dropped.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{Article, UNTITLED};

lazy_static! {
    static ref ARTICLE_MARKER: Regex = Regex::new(r"(?m)^Article \d+:\s*").unwrap();
    static ref LIST_ITEM: Regex = Regex::new(r"^(\d+)\.\s*(.+)$").unwrap();
    static ref TITLE: Regex = label("Title");
    static ref SOURCE: Regex = label("Source");
    static ref AUTHOR: Regex = label("Author");
    static ref PUBLISHED: Regex = label("Published");
    static ref SUMMARY: Regex = label("Summary");
    static ref DESCRIPTION: Regex = label("Description");
    static ref URL: Regex = label("URL");
    static ref EXCERPT: Regex = Regex::new(r"(?m)^Full Text Excerpt:[ \t]*").unwrap();
}

fn label(name: &str) -> Regex {
    Regex::new(&format!(r"(?m)^{}:[ \t]*(.*)$", regex::escape(name))).unwrap()
}

fn first_match(re: &Regex, block: &str) -> Option<String> {
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// The excerpt runs from its label to the end of the block.
fn excerpt(block: &str) -> Option<String> {
    let start = EXCERPT.find(block)?.end();
    let body = block[start..].trim_end();
    let body = body.strip_suffix("---").unwrap_or(body);
    Some(body.trim().to_string())
}

/// Picks the parser matching the layout of `raw`.
pub fn parse_feed(raw: &str) -> Vec<Article> {
    if ARTICLE_MARKER.is_match(raw) {
        parse_articles(raw)
    } else {
        parse_search_results(raw)
    }
}

/// Parses `Article N:` blocks.
pub fn parse_articles(raw: &str) -> Vec<Article> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    // Text ahead of the first marker is a preamble, not an article.
    let body = match ARTICLE_MARKER.find(raw) {
        Some(first) => &raw[first.start()..],
        None => raw,
    };

    ARTICLE_MARKER
        .split(body)
        .filter(|block| !block.trim().is_empty())
        .filter_map(parse_block)
        .collect()
}

fn parse_block(block: &str) -> Option<Article> {
    let title = first_match(&TITLE, block);
    let url = first_match(&URL, block);
    if title.is_none() && url.is_none() {
        return None;
    }

    Some(Article {
        title: title.unwrap_or_else(|| UNTITLED.to_string()),
        source: first_match(&SOURCE, block),
        author: first_match(&AUTHOR, block),
        published_at: first_match(&PUBLISHED, block),
        url,
        description: first_match(&SUMMARY, block).or_else(|| first_match(&DESCRIPTION, block)),
        content: excerpt(block),
    })
}

/// Parses the numbered listing produced by the search tool.
pub fn parse_search_results(report: &str) -> Vec<Article> {
    #[derive(Default)]
    struct Pending {
        title: Option<String>,
        url: Option<String>,
        summary: Option<String>,
    }

    impl Pending {
        fn take(&mut self) -> Option<Article> {
            let pending = std::mem::take(self);
            if pending.title.is_none() && pending.url.is_none() && pending.summary.is_none() {
                return None;
            }
            Some(Article {
                url: pending.url,
                description: pending.summary,
                ..Article::new(pending.title.unwrap_or_else(|| UNTITLED.to_string()))
            })
        }
    }

    let mut articles = Vec::new();
    let mut current = Pending::default();

    for line in report.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = LIST_ITEM.captures(line) {
            articles.extend(current.take());
            current.title = Some(caps[2].trim().to_string());
        } else if let Some(url) = line.strip_prefix("URL:") {
            current.url = Some(url.trim().to_string());
        } else if let Some(summary) = line.strip_prefix("Summary:") {
            current.summary = Some(summary.trim().to_string());
        }
    }
    articles.extend(current.take());

    articles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_article_with_only_title_and_url() {
        let articles = parse_articles("Article 1:\nTitle: A\nURL: http://x\n---\n");

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0], Article::new("A").with_url("http://x"));
    }

    #[test]
    fn test_parse_articles_extracts_fields() {
        let raw_feed = "Article 1:\n\
            Title: Joyful Discovery\n\
            Source: Inspiring Times\n\
            Author: Jane Doe\n\
            Published: 2024-05-01 08:00 UTC\n\
            Description: Scientists report a breakthrough.\n\
            URL: https://example.com/story\n\
            ---\n\
            Article 2:\n\
            Title: Community Triumph\n\
            Source: Hope Daily\n\
            Description: Volunteers rebuilt a playground.\n\
            URL: https://example.com/another\n\
            ---\n";

        let articles = parse_articles(raw_feed);

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Joyful Discovery");
        assert_eq!(articles[0].source.as_deref(), Some("Inspiring Times"));
        assert_eq!(articles[0].author.as_deref(), Some("Jane Doe"));
        assert_eq!(articles[0].published_at.as_deref(), Some("2024-05-01 08:00 UTC"));
        assert_eq!(
            articles[0].description.as_deref(),
            Some("Scientists report a breakthrough.")
        );
        assert_eq!(articles[1].title, "Community Triumph");
        assert_eq!(articles[1].author, None);
        assert_eq!(articles[1].url.as_deref(), Some("https://example.com/another"));
    }

    #[test]
    fn test_blank_feed_is_empty() {
        assert!(parse_articles("").is_empty());
        assert!(parse_articles("  \n\t").is_empty());
        assert!(parse_feed("").is_empty());
        assert!(parse_search_results("").is_empty());
    }

    #[test]
    fn test_segments_without_title_or_url_are_dropped() {
        let raw = "Article 1:\nSource: Nobody\n---\nArticle 2:\nURL: https://example.com/a\n";
        let articles = parse_articles(raw);

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, UNTITLED);
        assert_eq!(articles[0].url.as_deref(), Some("https://example.com/a"));
    }

    #[test]
    fn test_summary_wins_over_description_and_first_match_counts() {
        let raw = "Article 1:\n\
            Title: First\n\
            Description: fallback\n\
            Summary: preferred\n\
            Title: Second\n";
        let articles = parse_articles(raw);

        assert_eq!(articles[0].title, "First");
        assert_eq!(articles[0].description.as_deref(), Some("preferred"));
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        let articles = parse_articles("Article 1:\ntitle: lower\nURL: https://example.com\n");
        assert_eq!(articles[0].title, UNTITLED);
    }

    #[test]
    fn test_blank_label_is_present_but_empty() {
        let articles = parse_articles("Article 1:\nTitle: A\nSource:\nURL: http://x\n");

        assert_eq!(articles[0].source.as_deref(), Some(""));
        assert_eq!(articles[0].author, None);
    }

    #[test]
    fn test_excerpt_spans_to_end_of_block() {
        let raw = "Article 1:\n\
            Title: Garden\n\
            Full Text Excerpt:\n\
            Line one.\n\
            Line two.\n\
            ---\n\
            Article 2:\n\
            Title: Next\n";
        let articles = parse_articles(raw);

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].content.as_deref(), Some("Line one.\nLine two."));
        assert_eq!(articles[1].content, None);
    }

    #[test]
    fn test_preamble_before_first_marker_is_ignored() {
        let raw = "Search results\nURL: https://example.com/index\n\nArticle 1:\nTitle: A\nURL: http://x\n";
        let articles = parse_articles(raw);

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "A");
    }

    #[test]
    fn test_parse_search_results() {
        let report = "Found 2 search results:\n\n\
            1. Neighbours rebuild library\n   \
            URL: https://example.com/library\n   \
            Summary: A town came together.\n\n\
            2. Rescue dog finds home\n   \
            URL: https://example.com/dog\n";
        let articles = parse_search_results(report);

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Neighbours rebuild library");
        assert_eq!(articles[0].url.as_deref(), Some("https://example.com/library"));
        assert_eq!(articles[0].description.as_deref(), Some("A town came together."));
        assert_eq!(articles[1].title, "Rescue dog finds home");
        assert_eq!(articles[1].description, None);
    }

    #[test]
    fn test_search_result_before_any_title_gets_placeholder() {
        let articles = parse_search_results("URL: https://example.com/orphan\n");

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, UNTITLED);
    }

    #[test]
    fn test_parse_feed_selects_layout() {
        assert_eq!(parse_feed("Article 1:\nTitle: A\nURL: http://x\n")[0].title, "A");
        assert_eq!(parse_feed("1. B\nURL: http://y\n")[0].title, "B");
    }

    #[test]
    fn test_marker_inside_listing_title_is_not_a_block() {
        let report = "Found 2 search results:\n\n\
            1. Court restores Article 370: residents celebrate\n\
            URL: https://example.com/court\n\n\
            2. Rescue dog finds home\n\
            URL: https://example.com/dog\n";

        for articles in [parse_feed(report), parse_search_results(report)] {
            assert_eq!(articles.len(), 2);
            assert_eq!(articles[0].title, "Court restores Article 370: residents celebrate");
            assert_eq!(articles[0].url.as_deref(), Some("https://example.com/court"));
            assert_eq!(articles[1].title, "Rescue dog finds home");
        }
    }
}
