//! # Mutation Service
//!
//! Validated create/delete operations for posts, feedback and comments.
//!
//! Drafts mirror the raw request payloads with every field optional;
//! `validate()` turns a draft into a typed `New*` value or fails with
//! `InvalidParameters` before any store access. Echoing the received
//! payload back on failure is the API layer's job.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{moment_format, MutationOutcome, NewComment, NewFeedback, NewPost};
use crate::traits::{CommentRepo, FeedbackRepo, PostRepo};

/// User-facing message for missing required fields.
pub const MISSING_FIELDS: &str = "缺少必要字段";

/// User-facing message for an unparseable post timestamp.
pub const INVALID_MOMENT: &str = "moment 格式无效";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    #[serde(rename = "type")]
    pub kind: Option<i32>,
    pub messages: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<i64>,
    pub moment: Option<String>,
    pub label: Option<i32>,
    pub color: Option<i32>,
    pub img_url: Option<String>,
}

impl PostDraft {
    pub fn validate(self) -> Result<NewPost> {
        let (Some(kind), Some(messages), Some(name), Some(user_id), Some(moment), Some(label)) = (
            self.kind,
            self.messages,
            self.name,
            self.user_id,
            self.moment,
            self.label,
        ) else {
            return Err(AppError::InvalidParameters(MISSING_FIELDS.into()));
        };
        let moment = NaiveDateTime::parse_from_str(&moment, moment_format::FORMAT)
            .map_err(|_| AppError::InvalidParameters(INVALID_MOMENT.into()))?;
        Ok(NewPost {
            kind,
            messages,
            name,
            user_id,
            moment,
            label,
            color: self.color,
            img_url: self.img_url,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDraft {
    pub tiezi_id: Option<i64>,
    pub user_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<i32>,
    pub moment: Option<String>,
}

impl FeedbackDraft {
    pub fn validate(self) -> Result<NewFeedback> {
        let (Some(tiezi_id), Some(user_id), Some(kind), Some(moment)) =
            (self.tiezi_id, self.user_id, self.kind, self.moment)
        else {
            return Err(AppError::InvalidParameters(MISSING_FIELDS.into()));
        };
        Ok(NewFeedback {
            tiezi_id,
            user_id,
            kind,
            moment,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    pub tiezi_id: Option<i64>,
    pub user_id: Option<i64>,
    pub img_url: Option<String>,
    pub name: Option<String>,
    pub content: Option<String>,
    pub moment: Option<String>,
}

impl CommentDraft {
    pub fn validate(self) -> Result<NewComment> {
        let (Some(tiezi_id), Some(user_id), Some(img_url), Some(name), Some(content), Some(moment)) = (
            self.tiezi_id,
            self.user_id,
            self.img_url,
            self.name,
            self.content,
            self.moment,
        ) else {
            return Err(AppError::InvalidParameters(MISSING_FIELDS.into()));
        };
        Ok(NewComment {
            tiezi_id,
            user_id,
            img_url,
            name,
            content,
            moment,
        })
    }
}

/// Create/delete operations over the three repositories.
pub struct MutationService {
    posts: Arc<dyn PostRepo>,
    feedback: Arc<dyn FeedbackRepo>,
    comments: Arc<dyn CommentRepo>,
}

impl MutationService {
    pub fn new(
        posts: Arc<dyn PostRepo>,
        feedback: Arc<dyn FeedbackRepo>,
        comments: Arc<dyn CommentRepo>,
    ) -> Self {
        Self {
            posts,
            feedback,
            comments,
        }
    }

    pub async fn create_post(&self, draft: PostDraft) -> Result<MutationOutcome> {
        self.posts.create(draft.validate()?).await
    }

    pub async fn create_feedback(&self, draft: FeedbackDraft) -> Result<MutationOutcome> {
        self.feedback.create(draft.validate()?).await
    }

    pub async fn create_comment(&self, draft: CommentDraft) -> Result<MutationOutcome> {
        self.comments.create(draft.validate()?).await
    }

    /// Cascading delete: the post row and all dependent feedback/comment
    /// rows go in one atomic statement, never parent-then-children.
    pub async fn delete_post(&self, id: i64) -> Result<MutationOutcome> {
        self.posts.delete(id).await
    }

    pub async fn delete_feedback(&self, id: i64) -> Result<MutationOutcome> {
        self.feedback.delete(id).await
    }

    pub async fn delete_comment(&self, id: i64) -> Result<MutationOutcome> {
        self.comments.delete(id).await
    }
}
