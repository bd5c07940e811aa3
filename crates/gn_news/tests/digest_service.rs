use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use gn_core::config::{GoodNewsConfig, ServerCommand};
use gn_core::report::SOURCES_HEADING;
use gn_core::{
    Article, DailyStore, Error, NewsSummarizer, PageFetcher, Result, SearchTool, ToolReply,
};
use gn_news::DigestService;
use gn_storage::MarkdownStore;
use tempfile::TempDir;

const SEARCH_REPORT: &str = "Found 3 search results:\n\n\
    1. Neighbours rebuild library\n\
    URL: https://example.com/library\n\
    Summary: A town came together.\n\n\
    2. Rescue dog finds home\n\
    URL: https://example.com/dog\n\n\
    3. Library volunteers thanked\n\
    URL: https://example.com/library\n";

enum SearchBehaviour {
    Reply(ToolReply),
    Fail,
}

struct FakeSearch(SearchBehaviour);

#[async_trait]
impl SearchTool for FakeSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<ToolReply> {
        match &self.0 {
            SearchBehaviour::Reply(reply) => Ok(reply.clone()),
            SearchBehaviour::Fail => Err(Error::Tool("failed to spawn search server".to_string())),
        }
    }
}

#[derive(Default)]
struct FakeFetcher {
    requested: Mutex<Vec<String>>,
    broken: bool,
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_pages(&self, urls: &[String], _: usize) -> Result<HashMap<String, String>> {
        if self.broken {
            return Err(Error::Tool("fetch server crashed".to_string()));
        }
        self.requested.lock().unwrap().extend(urls.iter().cloned());
        Ok(urls
            .iter()
            .map(|url| (url.clone(), format!("Full story from {}", url)))
            .collect())
    }
}

#[derive(Default)]
struct CountingSummarizer {
    calls: AtomicUsize,
}

#[async_trait]
impl NewsSummarizer for CountingSummarizer {
    async fn summarize(
        &self,
        articles: &[Article],
        _extra_notes: &[String],
        _generated_at: &DateTime<Tz>,
    ) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("## 精选亮点\n- run {} covering {} stories", n, articles.len()))
    }
}

struct BrokenStore {
    dir: PathBuf,
}

#[async_trait]
impl DailyStore for BrokenStore {
    fn path_for(&self, date: chrono::NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.md", date))
    }

    async fn exists(&self, _: chrono::NaiveDate) -> Result<bool> {
        Ok(false)
    }

    async fn write_if_absent(&self, _: chrono::NaiveDate, _: &str) -> Result<bool> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only file system",
        )))
    }
}

fn config(output_dir: &Path) -> GoodNewsConfig {
    let server = |name: &str| ServerCommand {
        name: name.to_string(),
        command: "true".to_string(),
        args: vec![],
        working_dir: None,
    };
    GoodNewsConfig {
        query: "good news".to_string(),
        timezone: "UTC".to_string(),
        output_dir: output_dir.to_path_buf(),
        model: "test-model".to_string(),
        search_server: server("search"),
        search_max_results: 10,
        fetch_server: server("fetch"),
        fetch_max_chars: 4000,
        fetch_article_limit: 3,
    }
}

fn may_2_morning() -> DateTime<Tz> {
    chrono_tz::UTC.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap()
}

struct Harness {
    service: DigestService,
    fetcher: Arc<FakeFetcher>,
    summarizer: Arc<CountingSummarizer>,
}

fn harness(dir: &Path, search: SearchBehaviour, fetcher: FakeFetcher) -> Harness {
    let fetcher = Arc::new(fetcher);
    let summarizer = Arc::new(CountingSummarizer::default());
    let service = DigestService::new(
        config(dir),
        Arc::new(FakeSearch(search)),
        fetcher.clone(),
        summarizer.clone(),
        Arc::new(MarkdownStore::new(dir)),
    );
    Harness {
        service,
        fetcher,
        summarizer,
    }
}

const MARKER_TITLE_REPORT: &str = "Found 2 search results:\n\n\
    1. Court restores Article 370: residents celebrate\n\
    URL: https://example.com/court\n\
    Summary: A long wait ends.\n\n\
    2. Rescue dog finds home\n\
    URL: https://example.com/dog\n";

fn report_reply() -> SearchBehaviour {
    SearchBehaviour::Reply(ToolReply::text(vec![SEARCH_REPORT.to_string()]))
}

#[tokio::test]
async fn test_second_run_same_day_does_not_overwrite() {
    let tmp = TempDir::new().unwrap();
    let h = harness(tmp.path(), report_reply(), FakeFetcher::default());

    let first = h.service.generate(Some(may_2_morning()), true).await.unwrap();
    assert!(first.written);
    assert_eq!(first.output_path, tmp.path().join("2024-05-02.md"));
    let on_disk = std::fs::read_to_string(&first.output_path).unwrap();
    assert_eq!(on_disk, first.report);

    let second = h.service.generate(Some(may_2_morning()), true).await.unwrap();
    assert!(!second.written);
    assert_ne!(second.summary, first.summary);
    assert_eq!(std::fs::read_to_string(&first.output_path).unwrap(), on_disk);

    let files: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn test_articles_are_enriched_in_search_order() {
    let tmp = TempDir::new().unwrap();
    let h = harness(tmp.path(), report_reply(), FakeFetcher::default());

    let digest = h.service.generate(Some(may_2_morning()), false).await.unwrap();

    let titles: Vec<_> = digest.articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Neighbours rebuild library", "Rescue dog finds home", "Library volunteers thanked"]
    );
    assert_eq!(
        *h.fetcher.requested.lock().unwrap(),
        vec!["https://example.com/library".to_string(), "https://example.com/dog".to_string()]
    );
    assert_eq!(
        digest.articles[2].content.as_deref(),
        Some("Full story from https://example.com/library")
    );
    assert!(digest.raw_feed.starts_with("Found 3 search results:"));
    assert!(digest.raw_feed.contains("Article 3:\nTitle: Library volunteers thanked"));
    assert!(digest.report.contains(SOURCES_HEADING));
    assert!(digest.report.contains("3. [Library volunteers thanked](https://example.com/library)"));
}

#[tokio::test]
async fn test_no_write_leaves_disk_untouched() {
    let tmp = TempDir::new().unwrap();
    let h = harness(tmp.path(), report_reply(), FakeFetcher::default());

    let digest = h.service.generate(Some(may_2_morning()), false).await.unwrap();

    assert!(!digest.written);
    assert_eq!(digest.output_path, tmp.path().join("2024-05-02.md"));
    assert!(!digest.output_path.exists());
}

#[tokio::test]
async fn test_empty_search_is_fetch_failure() {
    let tmp = TempDir::new().unwrap();
    let h = harness(
        tmp.path(),
        SearchBehaviour::Reply(ToolReply::text(vec![])),
        FakeFetcher::default(),
    );

    let result = h.service.generate(Some(may_2_morning()), false).await;

    assert!(matches!(result, Err(Error::Fetch(_))));
    assert!(!tmp.path().join("2024-05-02.md").exists());
    assert_eq!(h.summarizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_error_reply_is_fetch_failure() {
    let tmp = TempDir::new().unwrap();
    let h = harness(
        tmp.path(),
        SearchBehaviour::Reply(ToolReply::error("rate limited")),
        FakeFetcher::default(),
    );

    match h.service.generate(Some(may_2_morning()), true).await {
        Err(Error::Fetch(message)) => assert!(message.contains("rate limited")),
        other => panic!("expected fetch failure, got {:?}", other.map(|d| d.report)),
    }
}

#[tokio::test]
async fn test_search_tool_failure_is_fetch_failure() {
    let tmp = TempDir::new().unwrap();
    let h = harness(tmp.path(), SearchBehaviour::Fail, FakeFetcher::default());

    let result = h.service.generate(Some(may_2_morning()), true).await;
    assert!(matches!(result, Err(Error::Fetch(_))));
}

#[tokio::test]
async fn test_unparsable_feed_is_no_articles() {
    let tmp = TempDir::new().unwrap();
    let h = harness(
        tmp.path(),
        SearchBehaviour::Reply(ToolReply::text(vec!["No results were found.".to_string()])),
        FakeFetcher::default(),
    );

    let result = h.service.generate(Some(may_2_morning()), true).await;

    assert!(matches!(result, Err(Error::NoArticles)));
    assert!(!tmp.path().join("2024-05-02.md").exists());
}

#[tokio::test]
async fn test_broken_fetcher_does_not_fail_run() {
    let tmp = TempDir::new().unwrap();
    let h = harness(
        tmp.path(),
        report_reply(),
        FakeFetcher {
            broken: true,
            ..Default::default()
        },
    );

    let digest = h.service.generate(Some(may_2_morning()), true).await.unwrap();

    assert!(digest.written);
    assert_eq!(digest.articles.len(), 3);
    assert!(digest.articles.iter().all(|a| a.content.is_none()));
}

#[tokio::test]
async fn test_write_failure_still_returns_digest() {
    let tmp = TempDir::new().unwrap();
    let service = DigestService::new(
        config(tmp.path()),
        Arc::new(FakeSearch(report_reply())),
        Arc::new(FakeFetcher::default()),
        Arc::new(CountingSummarizer::default()),
        Arc::new(BrokenStore {
            dir: tmp.path().to_path_buf(),
        }),
    );

    match service.generate(Some(may_2_morning()), true).await {
        Err(Error::Write { path, digest, .. }) => {
            assert_eq!(path, tmp.path().join("2024-05-02.md"));
            assert!(!digest.written);
            assert!(digest.report.contains("run 1 covering 3 stories"));
        }
        other => panic!("expected write failure, got {:?}", other.map(|d| d.written)),
    }
}

#[tokio::test]
async fn test_file_is_named_after_local_date() {
    let tmp = TempDir::new().unwrap();
    let h = harness(tmp.path(), report_reply(), FakeFetcher::default());
    let late_evening = Tz::America__Los_Angeles
        .with_ymd_and_hms(2024, 5, 2, 23, 30, 0)
        .unwrap();

    let digest = h.service.generate(Some(late_evening), true).await.unwrap();

    assert_eq!(digest.output_path, tmp.path().join("2024-05-02.md"));
    assert!(digest.report.starts_with("# 好消息速递 · 2024-05-02"));
}

#[tokio::test]
async fn test_listing_title_with_article_marker_keeps_every_result() {
    let tmp = TempDir::new().unwrap();
    let h = harness(
        tmp.path(),
        SearchBehaviour::Reply(ToolReply::text(vec![MARKER_TITLE_REPORT.to_string()])),
        FakeFetcher::default(),
    );

    let digest = h.service.generate(Some(may_2_morning()), false).await.unwrap();

    let titles: Vec<_> = digest.articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Court restores Article 370: residents celebrate", "Rescue dog finds home"]
    );
    assert_eq!(digest.articles[0].description.as_deref(), Some("A long wait ends."));
    assert!(digest.report.contains("run 1 covering 2 stories"));
}
