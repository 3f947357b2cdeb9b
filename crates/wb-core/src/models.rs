//! # Domain Models
//!
//! These structs represent the core entities of the message wall.
//! Field names on the wire are camelCase to match the client contract
//! (`userId`, `imgUrl`, `commentCount`, ...).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Wire and storage format for post timestamps, e.g. `2025-06-26 16:41:06`.
pub mod moment_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(moment: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&moment.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A message-board entry ("tiezi").
///
/// Immutable once created; removal cascades over its feedback and comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    /// 0 = text post, 1 = image post.
    #[serde(rename = "type")]
    pub kind: i32,
    pub messages: String,
    pub name: String,
    pub user_id: i64,
    #[serde(with = "moment_format")]
    pub moment: NaiveDateTime,
    /// Integer category tag; `-1` in queries means "all labels".
    pub label: i32,
    pub color: Option<i32>,
    pub img_url: Option<String>,
}

/// A like/report/revoke event attached to a post.
///
/// Revoke is recorded as an additive row, not a deletion, so "is liked"
/// is always derived by counting rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Like,
    Report,
    Revoke,
}

impl FeedbackKind {
    pub fn as_i32(self) -> i32 {
        match self {
            FeedbackKind::Like => 0,
            FeedbackKind::Report => 1,
            FeedbackKind::Revoke => 2,
        }
    }
}

/// A reply attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub tiezi_id: i64,
    pub user_id: i64,
    /// Avatar path of the comment author.
    pub img_url: String,
    pub name: String,
    pub content: String,
    pub moment: String,
}

/// Validated input for inserting a post.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub kind: i32,
    pub messages: String,
    pub name: String,
    pub user_id: i64,
    pub moment: NaiveDateTime,
    pub label: i32,
    pub color: Option<i32>,
    pub img_url: Option<String>,
}

/// Validated input for inserting a feedback row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub tiezi_id: i64,
    pub user_id: i64,
    pub kind: i32,
    pub moment: String,
}

/// Validated input for inserting a comment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub tiezi_id: i64,
    pub user_id: i64,
    pub img_url: String,
    pub name: String,
    pub content: String,
    pub moment: String,
}

/// What the store reports back after an insert or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    /// Generated identifier; `0` for deletes.
    pub insert_id: u64,
    pub affected_rows: u64,
}

/// The five derived counters attached to a post during enrichment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PostStats {
    pub like: i64,
    pub report: i64,
    pub revoke: i64,
    /// 1 when the requesting user has at least one like row for the post.
    #[serde(rename = "isLike")]
    pub is_like: i64,
    #[serde(rename = "commentCount")]
    pub comment_count: i64,
}

/// A post together with its aggregated counters, serialized flat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedPost {
    #[serde(flatten)]
    pub post: Post,
    #[serde(flatten)]
    pub stats: PostStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_post() -> Post {
        Post {
            id: 7,
            kind: 1,
            messages: "hello wall".into(),
            name: "张三".into(),
            user_id: 123,
            moment: NaiveDate::from_ymd_opt(2025, 6, 26)
                .unwrap()
                .and_hms_opt(16, 41, 6)
                .unwrap(),
            label: 2,
            color: Some(3),
            img_url: None,
        }
    }

    #[test]
    fn moment_uses_space_separated_format() {
        let value = serde_json::to_value(sample_post()).unwrap();
        assert_eq!(value["moment"], "2025-06-26 16:41:06");
    }

    #[test]
    fn enriched_post_serializes_flat_with_camel_case_keys() {
        let enriched = EnrichedPost {
            post: sample_post(),
            stats: PostStats {
                like: 3,
                report: 1,
                revoke: 0,
                is_like: 1,
                comment_count: 2,
            },
        };
        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["type"], 1);
        assert_eq!(value["userId"], 123);
        assert_eq!(value["like"], 3);
        assert_eq!(value["isLike"], 1);
        assert_eq!(value["commentCount"], 2);
    }

    #[test]
    fn post_deserializes_from_wire_shape() {
        let post: Post = serde_json::from_str(
            r#"{"id":1,"type":0,"messages":"m","name":"n","userId":9,
                "moment":"2025-01-02 03:04:05","label":-1,"color":null,"imgUrl":"a.png"}"#,
        )
        .unwrap();
        assert_eq!(post.user_id, 9);
        assert_eq!(post.img_url.as_deref(), Some("a.png"));
    }
}
