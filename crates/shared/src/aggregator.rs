use futures::stream::{self, StreamExt};
use std::collections::HashMap;

use crate::gateway::FeedGateway;
use crate::models::{FeedDiagnostic, FeedStatus, RawItem};
use crate::sources::FeedSource;

/// Fetches every configured source concurrently and independently. A
/// failing source becomes a `failed` diagnostic with zero items; it never
/// aborts the aggregate. The returned pool is deduplicated by canonical
/// link (last entry wins) and sorted most-recent-first.
pub async fn fetch_all_feeds(
    gateway: &dyn FeedGateway,
    sources: &[FeedSource],
) -> (Vec<RawItem>, Vec<FeedDiagnostic>) {
    let settled: Vec<(FeedSource, anyhow::Result<Vec<RawItem>>)> = stream::iter(sources)
        .map(|source| async move { (source.clone(), gateway.fetch_feed(source).await) })
        .buffer_unordered(sources.len().max(1))
        .collect()
        .await;

    let mut pool = Vec::new();
    let mut diagnostics = Vec::with_capacity(settled.len());

    for (source, outcome) in settled {
        match outcome {
            Ok(items) => {
                diagnostics.push(FeedDiagnostic {
                    name: source.name.to_string(),
                    status: FeedStatus::Gateway,
                    error: None,
                    item_count: items.len(),
                });
                pool.extend(items);
            }
            Err(e) => {
                eprintln!("Failed to fetch {}: {e:#}", source.name);
                diagnostics.push(FeedDiagnostic {
                    name: source.name.to_string(),
                    status: FeedStatus::Failed,
                    error: Some(e.to_string()),
                    item_count: 0,
                });
            }
        }
    }

    (dedup_and_sort(pool), diagnostics)
}

/// Collapses duplicate links (keeping the last-seen entry) and orders the
/// pool by publication time descending.
pub fn dedup_and_sort(items: Vec<RawItem>) -> Vec<RawItem> {
    let mut by_link: HashMap<String, RawItem> = HashMap::with_capacity(items.len());
    for item in items {
        by_link.insert(item.link.clone(), item);
    }

    let mut pool: Vec<RawItem> = by_link.into_values().collect();
    pool.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
    pool
}
