use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;
use gn_core::config::{now_in, GoodNewsConfig};
use gn_core::enrich::enrich_articles;
use gn_core::parser::parse_search_results;
use gn_core::report::{build_report, FALLBACK_SUMMARY};
use gn_core::{
    Article, DailyStore, Digest, Error, FetchResult, NewsSummarizer, PageFetcher, Result,
    SearchTool,
};
use tracing::{debug, info};

/// Appends one `Article N:` block per article to the search report so the
/// stored feed shows exactly what the summarizer was given.
pub fn compose_feed(search_report: &str, articles: &[Article]) -> String {
    if articles.is_empty() {
        return search_report.to_string();
    }

    let mut sections = vec![search_report.to_string()];
    for (i, article) in articles.iter().enumerate() {
        let mut lines = vec![format!("Article {}:", i + 1)];
        lines.push(format!("Title: {}", article.title));
        if let Some(url) = &article.url {
            lines.push(format!("URL: {}", url));
        }
        if let Some(description) = &article.description {
            lines.push(format!("Summary: {}", description));
        }
        if let Some(content) = &article.content {
            lines.push("Full Text Excerpt:".to_string());
            lines.push(content.clone());
        }
        sections.push(lines.join("\n"));
    }
    sections.join("\n\n")
}

/// Search, parse, enrich, summarize, render and persist one daily digest.
pub struct DigestService {
    config: GoodNewsConfig,
    search: Arc<dyn SearchTool>,
    fetcher: Arc<dyn PageFetcher>,
    summarizer: Arc<dyn NewsSummarizer>,
    store: Arc<dyn DailyStore>,
}

impl DigestService {
    pub fn new(
        config: GoodNewsConfig,
        search: Arc<dyn SearchTool>,
        fetcher: Arc<dyn PageFetcher>,
        summarizer: Arc<dyn NewsSummarizer>,
        store: Arc<dyn DailyStore>,
    ) -> Self {
        Self {
            config,
            search,
            fetcher,
            summarizer,
            store,
        }
    }

    /// Runs the search collaborator and turns its output into enriched articles.
    ///
    /// Fails with [`Error::Fetch`] when the search reports an error or returns
    /// no text, and with [`Error::NoArticles`] when nothing could be parsed.
    pub async fn fetch(&self) -> Result<FetchResult> {
        info!("🔎 Searching for: {}", self.config.query);
        let reply = self
            .search
            .search(&self.config.query, self.config.search_max_results)
            .await
            .map_err(|e| match e {
                Error::Fetch(_) => e,
                other => Error::Fetch(other.to_string()),
            })?;

        if reply.is_error {
            let message = reply.joined();
            let message = if message.is_empty() {
                "Unknown MCP error".to_string()
            } else {
                message
            };
            return Err(Error::Fetch(format!("search server reported an error: {}", message)));
        }

        let report = reply.joined();
        if report.is_empty() {
            return Err(Error::Fetch("No news data received from the search server.".to_string()));
        }

        let articles = parse_search_results(&report);
        if articles.is_empty() {
            return Err(Error::NoArticles);
        }
        info!("📰 Parsed {} articles", articles.len());

        let articles =
            enrich_articles(&articles, self.fetcher.as_ref(), self.config.enrich_policy()).await;
        let enriched = articles.iter().filter(|a| a.content.is_some()).count();
        debug!("{} of {} articles carry full text", enriched, articles.len());

        Ok(FetchResult {
            raw_feed: compose_feed(&report, &articles),
            extra_notes: Vec::new(),
            articles,
        })
    }

    /// Produces the digest for `now` (defaults to the current time in the
    /// configured zone). With `write`, the report is saved unless a file for
    /// that date already exists.
    pub async fn generate(&self, now: Option<DateTime<Tz>>, write: bool) -> Result<Digest> {
        let generated_at = now.unwrap_or_else(|| now_in(self.config.tz()));
        let fetched = self.fetch().await?;

        let summary = if fetched.articles.is_empty() {
            FALLBACK_SUMMARY.to_string()
        } else {
            info!("🧠 Summarizing {} articles", fetched.articles.len());
            self.summarizer
                .summarize(&fetched.articles, &fetched.extra_notes, &generated_at)
                .await?
        };

        let report = build_report(&summary, &fetched.articles, &fetched.extra_notes, &generated_at);
        let date = generated_at.date_naive();
        let output_path = self.store.path_for(date);

        let mut digest = Digest {
            report,
            summary,
            articles: fetched.articles,
            raw_feed: fetched.raw_feed,
            extra_notes: fetched.extra_notes,
            generated_at,
            output_path,
            written: false,
        };

        if write {
            match self.store.write_if_absent(date, &digest.report).await {
                Ok(written) => digest.written = written,
                Err(e) => {
                    return Err(Error::Write {
                        path: digest.output_path.clone(),
                        source: Box::new(e),
                        digest: Box::new(digest),
                    })
                }
            }
            if digest.written {
                info!("💾 Saved digest to {}", digest.output_path.display());
            } else {
                info!("⏭️ {} already exists", digest.output_path.display());
            }
        }

        Ok(digest)
    }
}
