use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::extractor::{extract_editorial_content, TARGET_MAX, TARGET_MIN};
use crate::gateway::FeedGateway;
use crate::models::{EnrichedItem, ExtractionMethod, RawItem};

/// Gateway-fetched article text below this length is not worth caching
/// or narrating; fall through to the feed's own excerpt.
const GATEWAY_TEXT_MIN: usize = 200;
/// Minimum useful length for text recovered from the feed excerpt.
const EMBEDDED_TEXT_MIN: usize = 100;

const ENRICH_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
struct CachedExtraction {
    excerpt: String,
    method: ExtractionMethod,
}

/// Fills in the editorial excerpt for candidate items. Successful
/// gateway extractions are cached for the life of the process, keyed by
/// canonical link; entries are write-once and re-derivable, so a racing
/// write of the same key is harmless.
pub struct Enricher {
    gateway: Arc<dyn FeedGateway>,
    cache: Mutex<HashMap<String, CachedExtraction>>,
}

impl Enricher {
    pub fn new(gateway: Arc<dyn FeedGateway>) -> Self {
        Self {
            gateway,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Enriches one item. Never fails: an item that yields no usable
    /// text comes back with an empty excerpt and the `failed` method,
    /// which callers filter out before assembling an episode.
    pub async fn enrich_one(&self, item: &RawItem) -> EnrichedItem {
        let cached = self.cache.lock().unwrap().get(&item.link).cloned();
        if let Some(cached) = cached {
            let paragraph_count = cached.excerpt.split("\n\n").count();
            return EnrichedItem {
                item: item.clone(),
                editorial_excerpt: cached.excerpt,
                method: cached.method,
                paragraph_count,
                from_cache: true,
            };
        }

        match self.gateway.fetch_article(&item.link).await {
            Ok(markup) => {
                let extraction = extract_editorial_content(&markup, TARGET_MIN, TARGET_MAX);
                if extraction.text.len() >= GATEWAY_TEXT_MIN {
                    self.cache.lock().unwrap().insert(
                        item.link.clone(),
                        CachedExtraction {
                            excerpt: extraction.text.clone(),
                            method: ExtractionMethod::GatewayHtml,
                        },
                    );
                    return EnrichedItem {
                        item: item.clone(),
                        editorial_excerpt: extraction.text,
                        method: ExtractionMethod::GatewayHtml,
                        paragraph_count: extraction.paragraph_count,
                        from_cache: false,
                    };
                }
            }
            Err(e) => {
                eprintln!("Article fetch failed for {}: {e:#}", item.link);
            }
        }

        // Cheap to recompute, so the embedded fallback is not cached.
        let fallback = extract_editorial_content(&item.excerpt, TARGET_MIN, TARGET_MAX);
        if fallback.text.len() >= EMBEDDED_TEXT_MIN {
            return EnrichedItem {
                item: item.clone(),
                editorial_excerpt: fallback.text,
                method: ExtractionMethod::RssEmbedded,
                paragraph_count: fallback.paragraph_count,
                from_cache: false,
            };
        }

        EnrichedItem {
            item: item.clone(),
            editorial_excerpt: String::new(),
            method: ExtractionMethod::Failed,
            paragraph_count: 0,
            from_cache: false,
        }
    }

    /// Enriches candidates concurrently; one item's failure never aborts
    /// the batch.
    pub async fn enrich_all(&self, items: &[RawItem]) -> Vec<EnrichedItem> {
        stream::iter(items)
            .map(|item| self.enrich_one(item))
            .buffer_unordered(ENRICH_CONCURRENCY)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{article_markup, editorial_paragraph, raw_item, MockGateway};
    use std::sync::atomic::Ordering;

    fn enricher(gateway: MockGateway) -> Enricher {
        Enricher::new(Arc::new(gateway))
    }

    #[tokio::test]
    async fn full_article_text_wins_and_is_cached() {
        let link = "https://x.test/full";
        let p1 = editorial_paragraph(150);
        let p2 = editorial_paragraph(150);
        let gateway =
            MockGateway::new().with_article(link, &article_markup(&[&p1, &p2]));
        let enricher = enricher(gateway);

        let enriched = enricher.enrich_one(&raw_item("a", "Full", link, 1)).await;

        assert_eq!(enriched.method, ExtractionMethod::GatewayHtml);
        assert_eq!(enriched.paragraph_count, 2);
        assert!(!enriched.from_cache);
        assert!(enriched.editorial_excerpt.len() >= 200);
        assert!(enriched.is_viable());
    }

    #[tokio::test]
    async fn short_article_falls_back_to_feed_excerpt() {
        let link = "https://x.test/thin";
        let thin = editorial_paragraph(120);
        let gateway = MockGateway::new().with_article(link, &article_markup(&[&thin]));
        let enricher = enricher(gateway);

        let mut item = raw_item("a", "Thin", link, 1);
        item.excerpt = article_markup(&[&editorial_paragraph(140)]);

        let enriched = enricher.enrich_one(&item).await;

        assert_eq!(enriched.method, ExtractionMethod::RssEmbedded);
        assert!(enriched.editorial_excerpt.len() >= 100);
        assert!(!enriched.from_cache);
    }

    #[tokio::test]
    async fn fetch_failure_falls_back_to_feed_excerpt() {
        let gateway = MockGateway::new();
        let enricher = enricher(gateway);

        let mut item = raw_item("a", "Offline", "https://x.test/missing", 1);
        item.excerpt = article_markup(&[&editorial_paragraph(140)]);

        let enriched = enricher.enrich_one(&item).await;
        assert_eq!(enriched.method, ExtractionMethod::RssEmbedded);
    }

    #[tokio::test]
    async fn exhausted_fallbacks_are_a_valid_terminal_outcome() {
        let enricher = enricher(MockGateway::new());
        let item = raw_item("a", "Hopeless", "https://x.test/nothing", 1);

        let enriched = enricher.enrich_one(&item).await;

        assert_eq!(enriched.method, ExtractionMethod::Failed);
        assert!(enriched.editorial_excerpt.is_empty());
        assert_eq!(enriched.paragraph_count, 0);
        assert!(!enriched.is_viable());
    }

    #[tokio::test]
    async fn second_enrichment_hits_the_cache_byte_for_byte() {
        let link = "https://x.test/cached";
        let p = editorial_paragraph(260);
        let gateway = MockGateway::new().with_article(link, &article_markup(&[&p]));
        let enricher = Enricher::new(Arc::new(gateway));
        let item = raw_item("a", "Cached", link, 1);

        let first = enricher.enrich_one(&item).await;
        let second = enricher.enrich_one(&item).await;

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.editorial_excerpt, second.editorial_excerpt);
        assert_eq!(first.method, second.method);
        assert_eq!(first.paragraph_count, second.paragraph_count);
    }

    #[tokio::test]
    async fn cache_hit_skips_the_network() {
        let link = "https://x.test/once";
        let p = editorial_paragraph(260);
        let mock = Arc::new(MockGateway::new().with_article(link, &article_markup(&[&p])));
        let enricher = Enricher::new(mock.clone() as Arc<dyn FeedGateway>);
        let item = raw_item("a", "Once", link, 1);

        enricher.enrich_one(&item).await;
        enricher.enrich_one(&item).await;

        assert_eq!(mock.article_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bulk_enrichment_collects_every_outcome() {
        let good = "https://x.test/good";
        let p = editorial_paragraph(260);
        let gateway = MockGateway::new().with_article(good, &article_markup(&[&p]));
        let enricher = enricher(gateway);

        let items = vec![
            raw_item("a", "Good", good, 1),
            raw_item("a", "Bad", "https://x.test/bad", 2),
            raw_item("a", "Ugly", "https://x.test/ugly", 3),
        ];

        let enriched = enricher.enrich_all(&items).await;
        assert_eq!(enriched.len(), 3);
        assert_eq!(
            enriched.iter().filter(|e| e.is_viable()).count(),
            1
        );
    }
}
