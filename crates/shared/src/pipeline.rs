use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::aggregator::fetch_all_feeds;
use crate::enricher::Enricher;
use crate::gateway::FeedGateway;
use crate::models::{Episode, EnrichedItem, FeedStatus, RawItem};
use crate::outro::{validated_or_fallback, ClosingLine, FALLBACK_OUTRO};
use crate::selector::pick_selection;
use crate::sources::FeedSource;

/// A fetched pool stays good for this long before a re-fetch.
pub const POOL_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Candidates handed to the enricher; generous, because most articles
/// refuse to yield usable text.
const CANDIDATE_COUNT: usize = 15;
const EPISODE_STORY_COUNT: usize = 3;
/// An enriched excerpt shorter than this cannot carry a narrated story.
const VIABLE_EXCERPT_MIN: usize = 100;

/// The only failures surfaced to callers. Everything else recovers
/// locally. Both are retryable states, not crashes.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("news pool is empty; no feed produced any item")]
    EmptyPool,
    #[error("could not extract enough editorial content from the current news; try again or refresh")]
    NoViableStories,
}

struct PoolSnapshot {
    fetched_at: Instant,
    items: Vec<RawItem>,
}

/// Session-scoped state: the rotation history and the short-lived pool
/// cache. Built at session start, dropped with the process; seen links
/// only ever grow.
pub struct Session {
    seen_links: HashSet<String>,
    pool_cache: Option<PoolSnapshot>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            seen_links: HashSet::new(),
            pool_cache: None,
        }
    }

    pub fn seen_links(&self) -> &HashSet<String> {
        &self.seen_links
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembles episodes: fetch → select → enrich → filter → outro. One
/// call produces a whole episode or a single retryable error; partial
/// episodes are never exposed.
pub struct Pipeline {
    gateway: Arc<dyn FeedGateway>,
    enricher: Enricher,
    closing_line: Option<Box<dyn ClosingLine>>,
    sources: Vec<FeedSource>,
}

impl Pipeline {
    pub fn new(
        gateway: Arc<dyn FeedGateway>,
        sources: Vec<FeedSource>,
        closing_line: Option<Box<dyn ClosingLine>>,
    ) -> Self {
        let enricher = Enricher::new(gateway.clone());
        Self {
            gateway,
            enricher,
            closing_line,
            sources,
        }
    }

    pub async fn run(
        &self,
        session: &mut Session,
        force_refetch: bool,
    ) -> Result<Episode, PipelineError> {
        let pool = self.pool(session, force_refetch).await;
        if pool.is_empty() {
            return Err(PipelineError::EmptyPool);
        }

        let candidates = pick_selection(&pool, &session.seen_links, CANDIDATE_COUNT);
        let enriched = self.enricher.enrich_all(&candidates).await;

        let mut viable: Vec<EnrichedItem> = enriched
            .into_iter()
            .filter(|e| e.editorial_excerpt.len() >= VIABLE_EXCERPT_MIN)
            .collect();
        // The longest editorial finds carry the episode.
        viable.sort_by(|a, b| b.editorial_excerpt.len().cmp(&a.editorial_excerpt.len()));
        viable.truncate(EPISODE_STORY_COUNT);

        if viable.is_empty() {
            return Err(PipelineError::NoViableStories);
        }

        for story in &viable {
            session.seen_links.insert(story.item.link.clone());
        }

        let outro = match &self.closing_line {
            Some(generator) => validated_or_fallback(generator.closing_line(&viable).await),
            None => FALLBACK_OUTRO.to_string(),
        };

        Ok(Episode {
            stories: viable,
            outro,
        })
    }

    async fn pool(&self, session: &mut Session, force_refetch: bool) -> Vec<RawItem> {
        if !force_refetch {
            if let Some(snapshot) = &session.pool_cache {
                if snapshot.fetched_at.elapsed() < POOL_CACHE_TTL {
                    return snapshot.items.clone();
                }
            }
        }

        let (items, diagnostics) = fetch_all_feeds(self.gateway.as_ref(), &self.sources).await;
        for diagnostic in &diagnostics {
            match diagnostic.status {
                FeedStatus::Gateway => {
                    eprintln!("Feed {}: {} items", diagnostic.name, diagnostic.item_count)
                }
                FeedStatus::Failed => eprintln!(
                    "Feed {}: failed ({})",
                    diagnostic.name,
                    diagnostic.error.as_deref().unwrap_or("unknown error")
                ),
            }
        }

        session.pool_cache = Some(PoolSnapshot {
            fetched_at: Instant::now(),
            items: items.clone(),
        });
        items
    }
}
