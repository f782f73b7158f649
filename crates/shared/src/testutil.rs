//! Test doubles shared by the unit tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::gateway::FeedGateway;
use crate::models::RawItem;
use crate::sources::FeedSource;

/// Gateway double: feeds and articles are looked up from fixed maps, and
/// anything absent fails the way a dead network call would.
pub(crate) struct MockGateway {
    feeds: Mutex<HashMap<String, Vec<RawItem>>>,
    articles: Mutex<HashMap<String, String>>,
    pub feed_calls: AtomicUsize,
    pub article_calls: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            feeds: Mutex::new(HashMap::new()),
            articles: Mutex::new(HashMap::new()),
            feed_calls: AtomicUsize::new(0),
            article_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_feed(self, key: &str, items: Vec<RawItem>) -> Self {
        self.feeds.lock().unwrap().insert(key.to_string(), items);
        self
    }

    pub fn with_article(self, link: &str, markup: &str) -> Self {
        self.articles
            .lock()
            .unwrap()
            .insert(link.to_string(), markup.to_string());
        self
    }
}

#[async_trait]
impl FeedGateway for MockGateway {
    async fn fetch_feed(&self, source: &FeedSource) -> Result<Vec<RawItem>> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        self.feeds
            .lock()
            .unwrap()
            .get(source.key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("feed unavailable: {}", source.key))
    }

    async fn fetch_article(&self, link: &str) -> Result<String> {
        self.article_calls.fetch_add(1, Ordering::SeqCst);
        self.articles
            .lock()
            .unwrap()
            .get(link)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("article unavailable: {link}"))
    }
}

pub(crate) fn test_source(key: &'static str, name: &'static str) -> FeedSource {
    FeedSource {
        key,
        name,
        url: "https://example.com/feed",
        priority: 1,
    }
}

pub(crate) fn raw_item(source_key: &str, title: &str, link: &str, hours_ago: i64) -> RawItem {
    RawItem {
        id: link.to_string(),
        source: source_key.to_uppercase(),
        source_key: source_key.to_string(),
        title: title.to_string(),
        excerpt: String::new(),
        link: link.to_string(),
        pub_date: Utc::now() - Duration::hours(hours_ago),
    }
}

/// A paragraph long enough for the classifier, padded to `len` bytes.
pub(crate) fn editorial_paragraph(len: usize) -> String {
    let seed = "The city of Boston spent another week rearranging itself in small ways. ";
    let mut text = String::new();
    while text.len() < len {
        text.push_str(seed);
    }
    text.truncate(len);
    text.trim_end().to_string()
}

/// Wraps paragraphs in an article container the extractor will pick.
pub(crate) fn article_markup(paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<p>{p}</p>"))
        .collect();
    format!("<html><body><article>{body}</article></body></html>")
}
