//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.
//! Count queries return the aggregate already safely extracted: a missing
//! row or missing `count` field is `0`, only transport faults are `Err`.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::Result;
use crate::models::{
    Comment, FeedbackKind, MutationOutcome, NewComment, NewFeedback, NewPost, Post,
};

/// Persistence contract for posts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    /// One feed page, newest first (`id DESC`). `label == -1` disables the
    /// label filter. An out-of-range page yields an empty Vec, not an error.
    async fn fetch_page(&self, label: i32, offset: i64, limit: i64) -> Result<Vec<Post>>;

    async fn create(&self, post: NewPost) -> Result<MutationOutcome>;

    /// Removes the post and every feedback/comment row referencing it in a
    /// single atomic multi-table statement.
    async fn delete(&self, id: i64) -> Result<MutationOutcome>;
}

/// Persistence contract for feedback rows.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FeedbackRepo: Send + Sync {
    async fn count(&self, tiezi_id: i64, kind: FeedbackKind) -> Result<i64>;

    /// Like rows of one user on one post. A `None` user binds SQL NULL,
    /// which matches nothing.
    async fn count_user_likes(&self, tiezi_id: i64, user_id: Option<i64>) -> Result<i64>;

    async fn create(&self, feedback: NewFeedback) -> Result<MutationOutcome>;

    async fn delete(&self, id: i64) -> Result<MutationOutcome>;
}

/// Persistence contract for comments.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn count(&self, tiezi_id: i64) -> Result<i64>;

    /// One page of a post's comments, newest first.
    async fn list_for_post(&self, tiezi_id: i64, offset: i64, limit: i64) -> Result<Vec<Comment>>;

    async fn get(&self, id: i64) -> Result<Option<Comment>>;

    async fn create(&self, comment: NewComment) -> Result<MutationOutcome>;

    async fn delete(&self, id: i64) -> Result<MutationOutcome>;
}
