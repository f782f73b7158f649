use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::models::RawItem;
use crate::sources::FeedSource;

/// Network boundary for feed reads and article lookups. Every call may
/// fail independently; callers decide how to degrade.
#[async_trait]
pub trait FeedGateway: Send + Sync {
    /// Fetches one feed and normalizes its entries. An error degrades
    /// that source to zero items, never the aggregate.
    async fn fetch_feed(&self, source: &FeedSource) -> Result<Vec<RawItem>>;

    /// Fetches the full article body behind a canonical link. Failure is
    /// non-fatal: it triggers the enricher's fallback path.
    async fn fetch_article(&self, link: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct RelayFeedResponse {
    #[serde(default)]
    items: Vec<RelayItem>,
}

#[derive(Debug, Deserialize)]
struct RelayItem {
    guid: Option<String>,
    link: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RelayArticleResponse {
    content: Option<String>,
    description: Option<String>,
}

/// Client for the JSON relay that fronts both feeds and article pages.
pub struct RelayGateway {
    client: Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl RelayGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; BostonPulse/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        let semaphore = Arc::new(Semaphore::new(10));

        Ok(Self {
            client,
            base_url: base_url.into(),
            semaphore,
        })
    }

    fn relay_url(&self, target: &str) -> String {
        format!("{}{}", self.base_url, urlencoding::encode(target))
    }

    async fn try_fetch_article(&self, link: &str) -> Result<String> {
        let response = self
            .client
            .get(self.relay_url(link))
            .send()
            .await
            .context("Failed to send article request")?;

        let status = response.status();
        if status == 401 || status == 403 || status == 404 {
            return Ok(String::new());
        }
        if !status.is_success() {
            anyhow::bail!("Gateway error: {}", status);
        }

        let article = response
            .json::<RelayArticleResponse>()
            .await
            .context("Failed to parse article response")?;

        Ok(content_or_description(article.content, article.description))
    }
}

#[async_trait]
impl FeedGateway for RelayGateway {
    async fn fetch_feed(&self, source: &FeedSource) -> Result<Vec<RawItem>> {
        let response = self
            .client
            .get(self.relay_url(source.url))
            .send()
            .await
            .with_context(|| format!("Failed to reach gateway for {}", source.name))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Gateway returned {} for {}", status, source.name);
        }

        let feed = response
            .json::<RelayFeedResponse>()
            .await
            .with_context(|| format!("Failed to parse gateway response for {}", source.name))?;

        Ok(raw_items_from_relay(source, feed, Utc::now()))
    }

    async fn fetch_article(&self, link: &str) -> Result<String> {
        let _permit = self.semaphore.acquire().await?;

        let mut last_error = None;
        for attempt in 0..3 {
            if attempt > 0 {
                let backoff = std::time::Duration::from_millis(500 * 2_u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }
            match self.try_fetch_article(link).await {
                Ok(markup) => return Ok(markup),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Article fetch failed: {link}")))
    }
}

/// `content` wins when it carries anything; empty strings fall through to
/// `description`, matching what feeds actually publish.
fn content_or_description(content: Option<String>, description: Option<String>) -> String {
    match content {
        Some(c) if !c.is_empty() => c,
        _ => description.unwrap_or_default(),
    }
}

fn raw_items_from_relay(
    source: &FeedSource,
    feed: RelayFeedResponse,
    now: DateTime<Utc>,
) -> Vec<RawItem> {
    feed.items
        .into_iter()
        .map(|entry| {
            let id = match &entry.guid {
                Some(guid) if !guid.is_empty() => guid.clone(),
                _ => entry.link.clone(),
            };
            RawItem {
                id,
                source: source.name.to_string(),
                source_key: source.key.to_string(),
                title: entry.title,
                excerpt: content_or_description(entry.content, entry.description),
                link: entry.link,
                pub_date: parse_pub_date(entry.pub_date.as_deref(), now),
            }
        })
        .collect()
}

/// Feeds disagree about date formats; try the common ones and fall back
/// to the fetch time.
fn parse_pub_date(raw: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return fallback;
    };
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return dt;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Utc.from_utc_datetime(&naive);
    }
    fallback
}
