use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::models::RawItem;

/// Items younger than this still count as fresh for tier-1 selection.
const FRESH_WINDOW_HOURS: i64 = 48;

/// Picks the next episode's candidates from a recency-sorted pool.
///
/// Three tiers, first sufficient one wins: fresh-and-unseen, then
/// unseen at any age, then a uniform reshuffle of the whole pool.
/// Repeats are expected once the unseen inventory runs out. An empty
/// pool yields an empty selection; that is the caller's failure to
/// report, not the selector's.
pub fn pick_selection(
    pool: &[RawItem],
    seen_links: &HashSet<String>,
    count: usize,
) -> Vec<RawItem> {
    pick_selection_at(pool, seen_links, count, Utc::now())
}

fn pick_selection_at(
    pool: &[RawItem],
    seen_links: &HashSet<String>,
    count: usize,
    now: DateTime<Utc>,
) -> Vec<RawItem> {
    let fresh_cutoff = now - Duration::hours(FRESH_WINDOW_HOURS);

    let fresh: Vec<RawItem> = pool
        .iter()
        .filter(|item| item.pub_date > fresh_cutoff && !seen_links.contains(&item.link))
        .cloned()
        .collect();
    if fresh.len() >= count {
        return fresh.into_iter().take(count).collect();
    }

    let unseen: Vec<RawItem> = pool
        .iter()
        .filter(|item| !seen_links.contains(&item.link))
        .cloned()
        .collect();
    if unseen.len() >= count {
        return unseen.into_iter().take(count).collect();
    }

    if pool.is_empty() {
        return Vec::new();
    }

    let mut rotation = pool.to_vec();
    rotation.shuffle(&mut rand::thread_rng());
    rotation.into_iter().take(count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::dedup_and_sort;
    use crate::testutil::raw_item;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 2, 12, 0, 0).unwrap()
    }

    fn item_hours_old(title: &str, hours: i64) -> RawItem {
        let mut item = raw_item("a", title, &format!("https://x.test/{title}"), 0);
        item.pub_date = now() - Duration::hours(hours);
        item
    }

    fn pool(items: Vec<RawItem>) -> Vec<RawItem> {
        dedup_and_sort(items)
    }

    #[test]
    fn fresh_unseen_items_win_most_recent_first() {
        let pool = pool(vec![
            item_hours_old("newest", 1),
            item_hours_old("recent", 5),
            item_hours_old("yesterday", 30),
            item_hours_old("older", 47),
            item_hours_old("stale", 90),
        ]);
        let picked = pick_selection_at(&pool, &HashSet::new(), 3, now());

        let titles: Vec<&str> = picked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["newest", "recent", "yesterday"]);
    }

    #[test]
    fn seen_links_are_skipped_while_fresh_inventory_lasts() {
        let pool = pool(vec![
            item_hours_old("newest", 1),
            item_hours_old("recent", 5),
            item_hours_old("yesterday", 30),
        ]);
        let seen: HashSet<String> = [pool[0].link.clone()].into();

        let picked = pick_selection_at(&pool, &seen, 2, now());
        let titles: Vec<&str> = picked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["recent", "yesterday"]);
    }

    #[test]
    fn stale_unseen_items_back_fill_when_fresh_runs_short() {
        let pool = pool(vec![
            item_hours_old("fresh", 1),
            item_hours_old("stale-a", 60),
            item_hours_old("stale-b", 80),
        ]);
        let picked = pick_selection_at(&pool, &HashSet::new(), 3, now());

        let titles: Vec<&str> = picked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["fresh", "stale-a", "stale-b"]);
    }

    #[test]
    fn exhausted_rotation_falls_back_to_the_full_pool() {
        let pool = pool(vec![
            item_hours_old("one", 1),
            item_hours_old("two", 5),
            item_hours_old("three", 9),
        ]);
        let seen: HashSet<String> = pool.iter().map(|i| i.link.clone()).collect();

        let picked = pick_selection_at(&pool, &seen, 2, now());
        assert_eq!(picked.len(), 2);
        for item in &picked {
            assert!(pool.iter().any(|p| p.link == item.link));
        }

        // Asking for more than the pool holds returns everything, once.
        let picked = pick_selection_at(&pool, &seen, 10, now());
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn empty_pool_yields_empty_selection() {
        assert!(pick_selection_at(&[], &HashSet::new(), 3, now()).is_empty());
    }
}
