//! Aggregations behind the analytics dashboard.
//!
//! Everything here is a pure function of already fetched rows, except
//! [`top_engaged_posts`], which awaits an injected comment-count lookup.

use futures::future::join_all;
use shared::dto::analytics::{CategoryShareDto, TopPostDto};
use shared::models::post::Post;
use shared::Result;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::future::Future;

/// Row counts split into named status buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPartition {
    pub total: u64,
    /// One entry per recognized category, in the order they were given.
    pub buckets: Vec<(String, u64)>,
}

impl StatusPartition {
    /// Count for `category`, 0 if it was not one of the recognized values.
    pub fn count(&self, category: &str) -> u64 {
        self.buckets
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn recognized(&self) -> u64 {
        self.buckets.iter().map(|(_, count)| count).sum()
    }

    /// Rows that counted toward `total` but matched no bucket.
    pub fn unrecognized(&self) -> u64 {
        self.total.saturating_sub(self.recognized())
    }
}

/// Counts rows per recognized status value.
///
/// Matching is exact and case-sensitive. Rows whose field matches none of
/// `categories` still count toward `total`.
pub fn partition_by_status<T, F>(rows: &[T], field: F, categories: &[&str]) -> StatusPartition
where
    F: Fn(&T) -> &str,
{
    let mut buckets: Vec<(String, u64)> = categories
        .iter()
        .map(|category| (category.to_string(), 0))
        .collect();

    for row in rows {
        let value = field(row);
        if let Some(bucket) = buckets.iter_mut().find(|(name, _)| name == value) {
            bucket.1 += 1;
        }
    }

    StatusPartition {
        total: rows.len() as u64,
        buckets,
    }
}

/// Sum of a numeric field over all rows; 0 for no rows.
pub fn sum_field<T, F>(rows: &[T], field: F) -> u64
where
    F: Fn(&T) -> u64,
{
    rows.iter().map(field).fold(0, u64::saturating_add)
}

/// `round(100 * part / whole)` with halves rounded up, in integer arithmetic.
/// Returns 0 when `whole` is 0.
pub fn percentage(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (200 * u128::from(part) + u128::from(whole)) / (2 * u128::from(whole));
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// The `k` most recently created published posts, newest first.
///
/// The sort is stable: posts with equal timestamps keep their fetch order.
pub fn select_recent_published(posts: &[Post], k: usize) -> Vec<&Post> {
    let mut published: Vec<&Post> = posts.iter().filter(|post| post.is_published()).collect();
    published.sort_by_key(|post| Reverse(post.created_at));
    published.truncate(k);
    published
}

/// Approved comment counts for the `k` most recent published posts.
///
/// All lookups are started together and awaited as a group; the output keeps
/// the order of [`select_recent_published`] regardless of which lookup
/// finishes first. A failed lookup reports 0 for that post only.
pub async fn top_engaged_posts<F, Fut>(
    posts: &[Post],
    k: usize,
    comments_by_post_id: F,
) -> Vec<TopPostDto>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<u64>>,
{
    let selected = select_recent_published(posts, k);
    let lookups = selected
        .iter()
        .map(|post| comments_by_post_id(post.id.clone()));
    let counts = join_all(lookups).await;

    selected
        .into_iter()
        .zip(counts)
        .map(|(post, count)| {
            let comment_count = match count {
                Ok(count) => count,
                Err(e) => {
                    log::warn!(
                        "Comment count for post {} unavailable, showing 0: {}",
                        post.id,
                        e
                    );
                    0
                }
            };
            TopPostDto {
                post_id: post.id.clone(),
                title: post.display_title().to_string(),
                comment_count,
            }
        })
        .collect()
}

/// Share of published posts per category.
///
/// Categories are compared as exact strings; posts without a category form
/// their own group, keyed `None`. Groups come out in order of first
/// appearance. No published posts gives an empty result.
pub fn group_by_category_with_percentage(posts: &[Post]) -> Vec<CategoryShareDto> {
    let published: Vec<&Post> = posts.iter().filter(|post| post.is_published()).collect();
    if published.is_empty() {
        return Vec::new();
    }
    let total = published.len() as u64;

    let mut index: HashMap<Option<&str>, usize> = HashMap::new();
    let mut groups: Vec<(Option<&str>, u64)> = Vec::new();
    for post in &published {
        let key = post.category.as_deref();
        match index.get(&key) {
            Some(&slot) => groups[slot].1 += 1,
            None => {
                index.insert(key, groups.len());
                groups.push((key, 1));
            }
        }
    }

    groups
        .into_iter()
        .map(|(category, count)| CategoryShareDto {
            category: category.map(str::to_string),
            count,
            percentage: percentage(count, total),
        })
        .collect()
}
