//! # Feed Assembler
//!
//! Drives pagination, fans enrichment out over every post of the page, and
//! reassembles the result in fetch order.
//!
//! The outer fan-out is one task per post; each task runs the aggregator's
//! inner five-way fan-out. `join_all` joins only after every inner group has
//! completed and yields results in input order, so concurrency never
//! perturbs the `id DESC` ordering established by the repository.

use std::sync::Arc;

use futures::future::join_all;

use crate::error::{AppError, Result};
use crate::models::EnrichedPost;
use crate::stats::StatAggregator;
use crate::traits::PostRepo;

/// Sentinel label meaning "no filter".
pub const ALL_LABELS: i32 = -1;

/// User-facing message for bad pagination values.
pub const INVALID_PAGINATION: &str = "分页参数无效";

pub struct FeedService {
    posts: Arc<dyn PostRepo>,
    stats: StatAggregator,
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostRepo>, stats: StatAggregator) -> Self {
        Self { posts, stats }
    }

    /// One enriched feed page.
    ///
    /// `page` and `page_size` must both be >= 1, checked before any query
    /// runs. A fault in the page fetch itself surfaces to the caller;
    /// per-post counter faults are absorbed inside the aggregator.
    pub async fn list_feed(
        &self,
        label: i32,
        page: i64,
        page_size: i64,
        user_id: Option<i64>,
    ) -> Result<Vec<EnrichedPost>> {
        if page < 1 || page_size < 1 {
            return Err(AppError::InvalidParameters(INVALID_PAGINATION.into()));
        }

        // `page >= 1`, so the subtraction cannot wrap; the multiplication can.
        let Some(offset) = (page - 1).checked_mul(page_size) else {
            return Err(AppError::InvalidParameters(INVALID_PAGINATION.into()));
        };
        let posts = self.posts.fetch_page(label, offset, page_size).await?;

        Ok(join_all(
            posts
                .into_iter()
                .map(|post| self.stats.enrich(post, user_id)),
        )
        .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedbackKind, Post, PostStats};
    use crate::traits::{MockCommentRepo, MockFeedbackRepo, MockPostRepo};
    use chrono::NaiveDate;

    fn post(id: i64, label: i32) -> Post {
        Post {
            id,
            kind: 0,
            messages: format!("post {id}"),
            name: "tester".into(),
            user_id: 1,
            moment: NaiveDate::from_ymd_opt(2025, 6, 26)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            label,
            color: None,
            img_url: None,
        }
    }

    fn quiet_stats() -> StatAggregator {
        let mut feedback = MockFeedbackRepo::new();
        feedback.expect_count().returning(|_, _| Ok(0));
        feedback.expect_count_user_likes().returning(|_, _| Ok(0));
        let mut comments = MockCommentRepo::new();
        comments.expect_count().returning(|_| Ok(0));
        StatAggregator::new(Arc::new(feedback), Arc::new(comments))
    }

    fn service(posts: MockPostRepo, stats: StatAggregator) -> FeedService {
        FeedService::new(Arc::new(posts), stats)
    }

    #[tokio::test]
    async fn rejects_bad_pagination_before_any_query() {
        let mut posts = MockPostRepo::new();
        posts.expect_fetch_page().never();
        let feed = service(posts, quiet_stats());

        for (page, page_size) in [(0, 10), (1, 0), (-3, 5)] {
            let err = feed
                .list_feed(ALL_LABELS, page, page_size, None)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidParameters(_)));
        }
    }

    #[tokio::test]
    async fn absurd_page_numbers_are_rejected_not_overflowed() {
        let mut posts = MockPostRepo::new();
        posts.expect_fetch_page().never();
        let feed = service(posts, quiet_stats());

        let err = feed
            .list_feed(ALL_LABELS, i64::MAX, 2, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), INVALID_PAGINATION);
    }

    #[tokio::test]
    async fn translates_page_number_into_offset() {
        let mut posts = MockPostRepo::new();
        posts
            .expect_fetch_page()
            .withf(|label, offset, limit| *label == 2 && *offset == 20 && *limit == 10)
            .returning(|_, _, _| Ok(vec![]));
        let feed = service(posts, quiet_stats());

        let page = feed.list_feed(2, 3, 10, None).await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn page_fetch_fault_surfaces_to_caller() {
        let mut posts = MockPostRepo::new();
        posts.expect_fetch_page().returning(|_, _, _| {
            Err(AppError::store(
                "server has gone away",
                "select * from tiezi order by id desc limit ?,?",
                vec!["0".into(), "10".into()],
            ))
        });
        let feed = service(posts, quiet_stats());

        let err = feed.list_feed(ALL_LABELS, 1, 10, None).await.unwrap_err();
        match err {
            AppError::Store { sql, .. } => assert!(sql.contains("tiezi")),
            other => panic!("expected store fault, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn preserves_fetch_order_regardless_of_counter_values() {
        let mut posts = MockPostRepo::new();
        posts
            .expect_fetch_page()
            .returning(|_, _, _| Ok(vec![post(9, 0), post(7, 0), post(5, 0)]));
        let feed = service(posts, quiet_stats());

        let page = feed.list_feed(ALL_LABELS, 1, 3, None).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|e| e.post.id).collect();
        assert_eq!(ids, vec![9, 7, 5]);
    }

    // Two posts, the newer one with real activity, the older one untouched.
    #[tokio::test]
    async fn two_post_page_with_mixed_activity() {
        let mut posts = MockPostRepo::new();
        posts
            .expect_fetch_page()
            .withf(|label, offset, limit| *label == ALL_LABELS && *offset == 0 && *limit == 2)
            .returning(|_, _, _| Ok(vec![post(5, 0), post(4, 0)]));

        let mut feedback = MockFeedbackRepo::new();
        feedback.expect_count().returning(|id, kind| {
            Ok(match (id, kind) {
                (5, FeedbackKind::Like) => 3,
                (5, FeedbackKind::Report) => 1,
                _ => 0,
            })
        });
        feedback
            .expect_count_user_likes()
            .returning(|id, user| Ok((id == 5 && user == Some(42)) as i64));
        let mut comments = MockCommentRepo::new();
        comments
            .expect_count()
            .returning(|id| Ok(if id == 5 { 2 } else { 0 }));

        let feed = service(
            posts,
            StatAggregator::new(Arc::new(feedback), Arc::new(comments)),
        );
        let page = feed.list_feed(ALL_LABELS, 1, 2, Some(42)).await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].post.id, 5);
        assert_eq!(
            page[0].stats,
            PostStats {
                like: 3,
                report: 1,
                revoke: 0,
                is_like: 1,
                comment_count: 2
            }
        );
        assert_eq!(page[1].post.id, 4);
        assert_eq!(page[1].stats, PostStats::default());
    }
}
