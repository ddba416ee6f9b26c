//! Filter and sort for the article list.
//!
//! [`arrange`] is pure: it borrows the articles, never reorders the input,
//! and is recomputed on every draw.
//!
//! Ordering:
//! 1. `high` importance before `normal`
//! 2. newer `publishedAt` first
//! 3. input order for equal timestamps (the sort is stable)
//!
//! `publishedAt` is read with [`NewsArticle::published`], so bare dates and
//! offset-less date-times order alongside full RFC 3339 values. Articles whose
//! `publishedAt` does not parse sort after every parseable one of the same
//! importance.

use crate::models::{CategoryFilter, Importance, NewsArticle};
use chrono::{DateTime, FixedOffset};
use std::cmp::Ordering;

fn importance_rank(importance: Importance) -> u8 {
    match importance {
        Importance::High => 0,
        Importance::Normal => 1,
    }
}

/// The articles passing `filter`, in display order.
pub fn arrange(articles: &[NewsArticle], filter: CategoryFilter) -> Vec<&NewsArticle> {
    let mut keyed: Vec<(u8, Option<DateTime<FixedOffset>>, &NewsArticle)> = articles
        .iter()
        .filter(|a| filter.admits(a.category))
        .map(|a| {
            (
                importance_rank(a.importance),
                a.published(),
                a,
            )
        })
        .collect();

    // `sort_by` is stable, which keeps input order on full ties.
    keyed.sort_by(|(rank_a, at_a, _), (rank_b, at_b, _)| {
        rank_a.cmp(rank_b).then_with(|| cmp_recency(at_a, at_b))
    });

    keyed.into_iter().map(|(_, _, a)| a).collect()
}

/// Newer first; unparseable last.
fn cmp_recency(a: &Option<DateTime<FixedOffset>>, b: &Option<DateTime<FixedOffset>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Number of articles passing `filter`.
pub fn category_count(articles: &[NewsArticle], filter: CategoryFilter) -> usize {
    articles.iter().filter(|a| filter.admits(a.category)).count()
}

/// Number of high-importance articles.
pub fn high_count(articles: &[NewsArticle]) -> usize {
    articles.iter().filter(|a| a.is_high()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::models::fixtures::article;
    use std::collections::HashSet;

    fn ids(list: &[&NewsArticle]) -> Vec<String> {
        list.iter().map(|a| a.id.clone()).collect()
    }

    /// A deterministic mix of categories, importances, and tied timestamps.
    fn mixed(n: usize) -> Vec<NewsArticle> {
        let cats = [Category::Model, Category::Service, Category::Other];
        (0..n)
            .map(|i| {
                let importance = if (i * 7) % 3 == 0 { Importance::High } else { Importance::Normal };
                let day = 1 + (i * 5) % 4;
                article(
                    &format!("202401{:02}-{:03}", day, i),
                    cats[(i * 11) % 3],
                    importance,
                    &format!("2024-01-{:02}T00:00:00Z", day),
                )
            })
            .collect()
    }

    #[test]
    fn test_high_before_normal_despite_older_timestamp() {
        let news = vec![
            article("20240101-001", Category::Model, Importance::High, "2024-01-01T00:00:00Z"),
            article("20240101-002", Category::Service, Importance::Normal, "2024-01-02T00:00:00Z"),
        ];
        assert_eq!(ids(&arrange(&news, CategoryFilter::All)), ["20240101-001", "20240101-002"]);
    }

    #[test]
    fn test_newer_first_within_importance() {
        let news = vec![
            article("20240101-001", Category::Model, Importance::Normal, "2024-01-01T00:00:00Z"),
            article("20240103-001", Category::Model, Importance::Normal, "2024-01-03T00:00:00Z"),
            article("20240102-001", Category::Model, Importance::Normal, "2024-01-02T09:00:00+09:00"),
        ];
        assert_eq!(
            ids(&arrange(&news, CategoryFilter::All)),
            ["20240103-001", "20240102-001", "20240101-001"]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let news = vec![
            article("20240101-003", Category::Other, Importance::Normal, "2024-01-01T00:00:00Z"),
            article("20240101-001", Category::Other, Importance::Normal, "2024-01-01T00:00:00Z"),
            article("20240101-002", Category::Other, Importance::Normal, "2024-01-01T00:00:00Z"),
        ];
        assert_eq!(
            ids(&arrange(&news, CategoryFilter::All)),
            ["20240101-003", "20240101-001", "20240101-002"]
        );
    }

    #[test]
    fn test_unparseable_timestamps_sort_last_within_importance() {
        let news = vec![
            article("20240101-001", Category::Model, Importance::Normal, "garbage"),
            article("20240101-002", Category::Model, Importance::Normal, "2024-01-01T00:00:00Z"),
            article("20240101-003", Category::Model, Importance::High, "garbage"),
        ];
        assert_eq!(
            ids(&arrange(&news, CategoryFilter::All)),
            ["20240101-003", "20240101-002", "20240101-001"]
        );
    }

    #[test]
    fn test_date_only_and_offsetless_timestamps_sort_by_recency() {
        let news = vec![
            article("20240101-001", Category::Model, Importance::Normal, "2024-01-01T00:00:00Z"),
            article("20240110-001", Category::Model, Importance::Normal, "2024-01-10"),
            article("20240105-001", Category::Service, Importance::Normal, "2024-01-05T10:00:00"),
        ];
        assert_eq!(
            ids(&arrange(&news, CategoryFilter::All)),
            ["20240110-001", "20240105-001", "20240101-001"]
        );
    }

    #[test]
    fn test_all_is_a_permutation() {
        let news = mixed(40);
        let out = arrange(&news, CategoryFilter::All);
        assert_eq!(out.len(), news.len());
        let out_ids: HashSet<_> = out.iter().map(|a| a.id.as_str()).collect();
        let in_ids: HashSet<_> = news.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(out_ids, in_ids);
    }

    #[test]
    fn test_category_filter_is_exact() {
        let news = mixed(40);
        for category in Category::ALL {
            let filter = CategoryFilter::Only(category);
            let out = arrange(&news, filter);
            assert!(out.iter().all(|a| a.category == category));
            assert_eq!(out.len(), news.iter().filter(|a| a.category == category).count());
            assert_eq!(out.len(), category_count(&news, filter));
        }
    }

    #[test]
    fn test_output_ordering_invariants() {
        let news = mixed(40);
        let out = arrange(&news, CategoryFilter::All);
        for pair in out.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.importance == Importance::Normal {
                assert_ne!(b.importance, Importance::High);
            }
            if a.importance == b.importance && a.published_at == b.published_at {
                let pos = |x: &NewsArticle| news.iter().position(|n| n.id == x.id).unwrap();
                assert!(pos(a) < pos(b), "stable order broken for {} / {}", a.id, b.id);
            }
        }
    }

    #[test]
    fn test_input_is_untouched() {
        let news = mixed(10);
        let copy = news.clone();
        let _ = arrange(&news, CategoryFilter::Only(Category::Model));
        assert_eq!(news, copy);
    }

    #[test]
    fn test_high_count() {
        let news = vec![
            article("20240101-001", Category::Model, Importance::High, "2024-01-01T00:00:00Z"),
            article("20240101-002", Category::Service, Importance::Normal, "2024-01-02T00:00:00Z"),
        ];
        assert_eq!(high_count(&news), 1);
        assert_eq!(high_count(&[]), 0);
    }
}
