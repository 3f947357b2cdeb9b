//! # Stat Aggregator
//!
//! Enriches a single post with its five derived counters: like, report and
//! revoke counts, the requesting user's like status, and the comment count.
//!
//! The five sub-queries are dispatched concurrently, and each result passes
//! through a recover-to-default step: a fault degrades only that statistic
//! to zero. `enrich` is therefore infallible and a post is never dropped
//! from a page because its counters could not be computed.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{EnrichedPost, FeedbackKind, Post, PostStats};
use crate::traits::{CommentRepo, FeedbackRepo};

pub struct StatAggregator {
    feedback: Arc<dyn FeedbackRepo>,
    comments: Arc<dyn CommentRepo>,
}

impl StatAggregator {
    pub fn new(feedback: Arc<dyn FeedbackRepo>, comments: Arc<dyn CommentRepo>) -> Self {
        Self { feedback, comments }
    }

    /// Attaches the counters to `post` for the given requesting user.
    pub async fn enrich(&self, post: Post, user_id: Option<i64>) -> EnrichedPost {
        let id = post.id;
        let (like, report, revoke, user_likes, comment_count) = futures::join!(
            self.feedback.count(id, FeedbackKind::Like),
            self.feedback.count(id, FeedbackKind::Report),
            self.feedback.count(id, FeedbackKind::Revoke),
            self.feedback.count_user_likes(id, user_id),
            self.comments.count(id),
        );

        let stats = PostStats {
            like: zero_on_fault(id, "like", like),
            report: zero_on_fault(id, "report", report),
            revoke: zero_on_fault(id, "revoke", revoke),
            is_like: (zero_on_fault(id, "isLike", user_likes) > 0) as i64,
            comment_count: zero_on_fault(id, "commentCount", comment_count),
        };

        EnrichedPost { post, stats }
    }
}

/// Per-field recovery: log the fault with the offending post id, default to 0.
fn zero_on_fault(tiezi_id: i64, stat: &str, result: Result<i64>) -> i64 {
    match result {
        Ok(count) => count,
        Err(cause) => {
            log::warn!("stat query failed for tiezi {tiezi_id} ({stat}): {cause}");
            0
        }
    }
}
