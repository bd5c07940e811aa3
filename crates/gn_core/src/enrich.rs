use tracing::{debug, warn};

use crate::models::PageFetcher;
use crate::types::Article;

/// Bounds for one enrichment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichPolicy {
    /// Maximum characters requested per page.
    pub max_length: usize,
    /// Maximum number of distinct URLs fetched per run.
    pub url_limit: usize,
}

/// Distinct URLs in first-seen order, capped at `limit`.
pub fn urls_to_fetch(articles: &[Article], limit: usize) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for url in articles.iter().filter_map(|a| a.url.as_ref()) {
        if urls.len() == limit {
            break;
        }
        if !urls.contains(url) {
            urls.push(url.clone());
        }
    }
    urls
}

/// Attaches fetched body text to articles whose URL could be fetched.
///
/// The result always has the same length and order as `articles`. Enrichment
/// is best effort: if the fetcher cannot be used at all the input comes back
/// unchanged.
pub async fn enrich_articles(
    articles: &[Article],
    fetcher: &dyn PageFetcher,
    policy: EnrichPolicy,
) -> Vec<Article> {
    let urls = urls_to_fetch(articles, policy.url_limit);
    if urls.is_empty() {
        return articles.to_vec();
    }

    debug!("Fetching {} article bodies", urls.len());
    let contents = match fetcher.fetch_pages(&urls, policy.max_length).await {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Enrichment skipped: {}", e);
            return articles.to_vec();
        }
    };

    articles
        .iter()
        .map(|article| {
            match article.url.as_ref().and_then(|url| contents.get(url)) {
                Some(content) => article.with_content(content.as_str()),
                None => article.clone(),
            }
        })
        .collect()
}
