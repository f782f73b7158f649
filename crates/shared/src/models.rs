use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One normalized entry from a feed. Created by the aggregator, never
/// mutated afterwards. `link` is the canonical identity used for
/// deduplication and enrichment caching across the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    /// Feed-provided guid when present, otherwise the link.
    pub id: String,
    pub source: String,
    pub source_key: String,
    pub title: String,
    /// Feed-provided content or description, still raw markup.
    pub excerpt: String,
    pub link: String,
    pub pub_date: DateTime<Utc>,
}

/// How an item's editorial excerpt was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    #[serde(rename = "gateway-html")]
    GatewayHtml,
    #[serde(rename = "rss-embedded")]
    RssEmbedded,
    #[serde(rename = "failed")]
    Failed,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ExtractionMethod::GatewayHtml => "gateway-html",
            ExtractionMethod::RssEmbedded => "rss-embedded",
            ExtractionMethod::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// A RawItem plus the validated editorial text. An empty excerpt means
/// extraction failed; such items must be filtered before an episode is
/// assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedItem {
    pub item: RawItem,
    pub editorial_excerpt: String,
    pub method: ExtractionMethod,
    pub paragraph_count: usize,
    pub from_cache: bool,
}

impl EnrichedItem {
    pub fn is_viable(&self) -> bool {
        !self.editorial_excerpt.is_empty()
    }
}

/// The finalized set of stories plus closing line for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub stories: Vec<EnrichedItem>,
    pub outro: String,
}

/// Per-source fetch outcome, kept for observability only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    Gateway,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedDiagnostic {
    pub name: String,
    pub status: FeedStatus,
    pub error: Option<String>,
    pub item_count: usize,
}

/// Versioned on-disk wrapper for a finalized episode.
#[derive(Debug, Serialize, Deserialize)]
pub struct EpisodeDocument {
    pub version: String,
    pub created_at: String,
    pub episode: Episode,
}

impl EpisodeDocument {
    pub fn new(episode: Episode) -> Self {
        Self {
            version: "1.0".to_string(),
            created_at: Utc::now().to_rfc3339(),
            episode,
        }
    }
}
