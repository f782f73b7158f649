/// Display name used in the episode intro and transcripts.
pub const SHOW_NAME: &str = "Boston Pulse";

/// JSON relay used for both feed reads and article lookups. The relay
/// accepts any URL as `rss_url` and answers with `{ status, items }` for
/// feeds or `{ content, description }` for single pages.
pub const DEFAULT_GATEWAY_URL: &str = "https://api.rss2json.com/v1/api.json?rss_url=";

/// One configured news feed. Loaded once at startup, never mutated.
#[derive(Debug, Clone)]
pub struct FeedSource {
    pub key: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    /// 1 = high editorial depth, 2 = high-frequency city-wide,
    /// 3 = hyper-local or official updates.
    pub priority: u8,
}

/// Curated Boston feeds, in priority order.
pub fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource {
            key: "dfp",
            name: "Daily Free Press",
            url: "https://dailyfreepress.com/feed/",
            priority: 1,
        },
        FeedSource {
            key: "wbur",
            name: "WBUR",
            url: "https://www.wbur.org/rss",
            priority: 1,
        },
        FeedSource {
            key: "bcom",
            name: "Boston.com",
            url: "https://www.boston.com/tag/local-news/feed/",
            priority: 2,
        },
        FeedSource {
            key: "uhub",
            name: "Universal Hub",
            url: "https://www.universalhub.com/feed",
            priority: 3,
        },
        FeedSource {
            key: "bgov",
            name: "Boston.gov",
            url: "https://www.boston.gov/news/rss",
            priority: 3,
        },
    ]
}
