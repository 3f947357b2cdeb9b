//! # wb-db-mysql Implementation
//!
//! Maps the MySQL relational model onto the `wb-core` ports.
//!
//! Every query goes through the shared `MySqlPool`; sqlx scopes connection
//! acquire/release inside each call, so connections return to the pool on
//! every exit path, faults included. Store faults are mapped to
//! `AppError::Store` carrying the offending statement and its rendered
//! parameters for the 400 response detail.

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;

use wb_core::error::{AppError, Result};
use wb_core::feed::ALL_LABELS;
use wb_core::models::{
    Comment, FeedbackKind, MutationOutcome, NewComment, NewFeedback, NewPost, Post,
};
use wb_core::traits::{CommentRepo, FeedbackRepo, PostRepo};

const CREATE_TIEZI_TABLE: &str = "CREATE TABLE IF NOT EXISTS tiezi (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    type INT NOT NULL COMMENT '类型0贴子1图片',
    messages VARCHAR(255) NOT NULL COMMENT '内容',
    name VARCHAR(100) NOT NULL COMMENT '用户名',
    userId BIGINT NOT NULL COMMENT '创建者id',
    moment DATETIME NOT NULL COMMENT '创建时间',
    label INT NOT NULL COMMENT '标签',
    color INT COMMENT '颜色',
    imgUrl VARCHAR(100) COMMENT '图片路径'
)";

const CREATE_FEEDBACK_TABLE: &str = "CREATE TABLE IF NOT EXISTS feedback (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    tieziId BIGINT NOT NULL COMMENT '贴子id',
    userId BIGINT NOT NULL COMMENT '反馈者id',
    type INT NOT NULL COMMENT '反馈类型0喜欢1举报2撤销',
    moment VARCHAR(100) NOT NULL COMMENT '时间'
)";

const CREATE_COMMENT_TABLE: &str = "CREATE TABLE IF NOT EXISTS comment (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    tieziId BIGINT NOT NULL COMMENT '贴子id',
    userId BIGINT NOT NULL COMMENT '评论者id',
    imgUrl VARCHAR(100) NOT NULL COMMENT '头像路径',
    name VARCHAR(100) NOT NULL COMMENT '用户名',
    content VARCHAR(100) NOT NULL COMMENT '评论内容',
    moment VARCHAR(100) NOT NULL COMMENT '时间'
)";

const INSERT_TIEZI: &str =
    "insert into tiezi(type,messages,name,userId,moment,label,color,imgUrl) values(?,?,?,?,?,?,?,?)";
const INSERT_FEEDBACK: &str = "insert into feedback(tieziId,userId,type,moment) values(?,?,?,?)";
const INSERT_COMMENT: &str =
    "insert into comment(tieziId,userId,imgUrl,name,content,moment) values(?,?,?,?,?,?)";

// Multi-table delete: the post row and every dependent feedback/comment row
// go in one atomic statement, so an interruption can never leave orphans.
const DELETE_TIEZI: &str = "delete a,b,c from tiezi as a \
    left join comment as b on a.id = b.tieziId \
    left join feedback as c on a.id = c.tieziId \
    where a.id = ?";
const DELETE_FEEDBACK: &str = "delete from feedback where id = ?";
const DELETE_COMMENT: &str = "delete from comment where id = ?";

const SELECT_PAGE_ALL: &str = "select * from tiezi order by id desc limit ?,?";
const SELECT_PAGE_LABEL: &str = "select * from tiezi where label = ? order by id desc limit ?,?";

const COUNT_FEEDBACK: &str = "select count(*) as count from feedback where tieziId=? and type=?";
const COUNT_USER_LIKES: &str =
    "select count(*) as count from feedback where tieziId = ? and userId = ? and type = 0";
const COUNT_COMMENTS: &str = "select count(*) as count from comment where tieziId=?";

const SELECT_COMMENTS: &str = "select * from comment where tieziId = ? order by id desc limit ?,?";
const SELECT_COMMENT_BY_ID: &str = "select * from comment where id = ?";

pub struct MySqlWallStore {
    pool: MySqlPool,
}

impl MySqlWallStore {
    /// Connects a fresh pool to the given MySQL URL. The pool is the only
    /// shared resource; construct one at startup and inject it everywhere.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates the three tables when they do not exist yet.
    pub async fn init_schema(&self) -> anyhow::Result<()> {
        for ddl in [CREATE_TIEZI_TABLE, CREATE_FEEDBACK_TABLE, CREATE_COMMENT_TABLE] {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        log::info!("schema ready: tiezi, feedback, comment");
        Ok(())
    }
}

/// Safe extraction of a one-row aggregate: a missing row or missing/untyped
/// `count` field is 0, never a fault.
fn safe_count(rows: &[MySqlRow]) -> i64 {
    rows.first()
        .and_then(|row| row.try_get::<i64, _>("count").ok())
        .unwrap_or(0)
}

fn render<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "NULL".into())
}

fn map_post(row: &MySqlRow) -> sqlx::Result<Post> {
    Ok(Post {
        id: row.try_get("id")?,
        kind: row.try_get("type")?,
        messages: row.try_get("messages")?,
        name: row.try_get("name")?,
        user_id: row.try_get("userId")?,
        moment: row.try_get("moment")?,
        label: row.try_get("label")?,
        color: row.try_get("color")?,
        img_url: row.try_get("imgUrl")?,
    })
}

fn map_comment(row: &MySqlRow) -> sqlx::Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        tiezi_id: row.try_get("tieziId")?,
        user_id: row.try_get("userId")?,
        img_url: row.try_get("imgUrl")?,
        name: row.try_get("name")?,
        content: row.try_get("content")?,
        moment: row.try_get("moment")?,
    })
}

fn outcome(result: sqlx::mysql::MySqlQueryResult) -> MutationOutcome {
    MutationOutcome {
        insert_id: result.last_insert_id(),
        affected_rows: result.rows_affected(),
    }
}

#[async_trait]
impl PostRepo for MySqlWallStore {
    async fn fetch_page(&self, label: i32, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let (sql, params, query) = if label == ALL_LABELS {
            (
                SELECT_PAGE_ALL,
                vec![offset.to_string(), limit.to_string()],
                sqlx::query(SELECT_PAGE_ALL).bind(offset).bind(limit),
            )
        } else {
            (
                SELECT_PAGE_LABEL,
                vec![label.to_string(), offset.to_string(), limit.to_string()],
                sqlx::query(SELECT_PAGE_LABEL)
                    .bind(label)
                    .bind(offset)
                    .bind(limit),
            )
        };

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store(e, sql, params.clone()))?;
        rows.iter()
            .map(|row| map_post(row).map_err(|e| AppError::store(e, sql, params.clone())))
            .collect()
    }

    async fn create(&self, post: NewPost) -> Result<MutationOutcome> {
        let params = vec![
            post.kind.to_string(),
            post.messages.clone(),
            post.name.clone(),
            post.user_id.to_string(),
            post.moment.to_string(),
            post.label.to_string(),
            render(&post.color),
            render(&post.img_url),
        ];
        sqlx::query(INSERT_TIEZI)
            .bind(post.kind)
            .bind(post.messages)
            .bind(post.name)
            .bind(post.user_id)
            .bind(post.moment)
            .bind(post.label)
            .bind(post.color)
            .bind(post.img_url)
            .execute(&self.pool)
            .await
            .map(outcome)
            .map_err(|e| AppError::store(e, INSERT_TIEZI, params))
    }

    async fn delete(&self, id: i64) -> Result<MutationOutcome> {
        sqlx::query(DELETE_TIEZI)
            .bind(id)
            .execute(&self.pool)
            .await
            .map(outcome)
            .map_err(|e| AppError::store(e, DELETE_TIEZI, vec![id.to_string()]))
    }
}

#[async_trait]
impl FeedbackRepo for MySqlWallStore {
    async fn count(&self, tiezi_id: i64, kind: FeedbackKind) -> Result<i64> {
        let params = vec![tiezi_id.to_string(), kind.as_i32().to_string()];
        let rows = sqlx::query(COUNT_FEEDBACK)
            .bind(tiezi_id)
            .bind(kind.as_i32())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store(e, COUNT_FEEDBACK, params))?;
        Ok(safe_count(&rows))
    }

    async fn count_user_likes(&self, tiezi_id: i64, user_id: Option<i64>) -> Result<i64> {
        let params = vec![tiezi_id.to_string(), render(&user_id)];
        let rows = sqlx::query(COUNT_USER_LIKES)
            .bind(tiezi_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store(e, COUNT_USER_LIKES, params))?;
        Ok(safe_count(&rows))
    }

    async fn create(&self, feedback: NewFeedback) -> Result<MutationOutcome> {
        let params = vec![
            feedback.tiezi_id.to_string(),
            feedback.user_id.to_string(),
            feedback.kind.to_string(),
            feedback.moment.clone(),
        ];
        sqlx::query(INSERT_FEEDBACK)
            .bind(feedback.tiezi_id)
            .bind(feedback.user_id)
            .bind(feedback.kind)
            .bind(feedback.moment)
            .execute(&self.pool)
            .await
            .map(outcome)
            .map_err(|e| AppError::store(e, INSERT_FEEDBACK, params))
    }

    async fn delete(&self, id: i64) -> Result<MutationOutcome> {
        sqlx::query(DELETE_FEEDBACK)
            .bind(id)
            .execute(&self.pool)
            .await
            .map(outcome)
            .map_err(|e| AppError::store(e, DELETE_FEEDBACK, vec![id.to_string()]))
    }
}

#[async_trait]
impl CommentRepo for MySqlWallStore {
    async fn count(&self, tiezi_id: i64) -> Result<i64> {
        let rows = sqlx::query(COUNT_COMMENTS)
            .bind(tiezi_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store(e, COUNT_COMMENTS, vec![tiezi_id.to_string()]))?;
        Ok(safe_count(&rows))
    }

    async fn list_for_post(&self, tiezi_id: i64, offset: i64, limit: i64) -> Result<Vec<Comment>> {
        let params = vec![tiezi_id.to_string(), offset.to_string(), limit.to_string()];
        let rows = sqlx::query(SELECT_COMMENTS)
            .bind(tiezi_id)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store(e, SELECT_COMMENTS, params.clone()))?;
        rows.iter()
            .map(|row| {
                map_comment(row).map_err(|e| AppError::store(e, SELECT_COMMENTS, params.clone()))
            })
            .collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(SELECT_COMMENT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store(e, SELECT_COMMENT_BY_ID, vec![id.to_string()]))?;
        row.as_ref()
            .map(|r| {
                map_comment(r)
                    .map_err(|e| AppError::store(e, SELECT_COMMENT_BY_ID, vec![id.to_string()]))
            })
            .transpose()
    }

    async fn create(&self, comment: NewComment) -> Result<MutationOutcome> {
        let params = vec![
            comment.tiezi_id.to_string(),
            comment.user_id.to_string(),
            comment.img_url.clone(),
            comment.name.clone(),
            comment.content.clone(),
            comment.moment.clone(),
        ];
        sqlx::query(INSERT_COMMENT)
            .bind(comment.tiezi_id)
            .bind(comment.user_id)
            .bind(comment.img_url)
            .bind(comment.name)
            .bind(comment.content)
            .bind(comment.moment)
            .execute(&self.pool)
            .await
            .map(outcome)
            .map_err(|e| AppError::store(e, INSERT_COMMENT, params))
    }

    async fn delete(&self, id: i64) -> Result<MutationOutcome> {
        sqlx::query(DELETE_COMMENT)
            .bind(id)
            .execute(&self.pool)
            .await
            .map(outcome)
            .map_err(|e| AppError::store(e, DELETE_COMMENT, vec![id.to_string()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wb_core::traits::{CommentRepo, FeedbackRepo, PostRepo};

    #[test]
    fn render_formats_absent_params_as_null() {
        assert_eq!(render(&Some(7)), "7");
        assert_eq!(render::<i64>(&None), "NULL");
    }

    #[test]
    fn counting_an_empty_row_set_is_zero() {
        assert_eq!(safe_count(&[]), 0);
    }

    // Live-database tests. Point WALL_TEST_DATABASE_URL at a scratch MySQL
    // database and run with `cargo test -- --ignored`.
    async fn scratch_store() -> MySqlWallStore {
        let url = std::env::var("WALL_TEST_DATABASE_URL")
            .expect("WALL_TEST_DATABASE_URL must point at a scratch database");
        let store = MySqlWallStore::connect(&url).await.unwrap();
        store.init_schema().await.unwrap();
        store
    }

    fn new_post(label: i32) -> NewPost {
        NewPost {
            kind: 0,
            messages: "integration".into(),
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

    #[tokio::test]
    #[ignore]
    async fn cascade_delete_leaves_no_orphans() {
        let store = scratch_store().await;
        let post_id = PostRepo::create(&store, new_post(0)).await.unwrap().insert_id as i64;

        FeedbackRepo::create(
            &store,
            NewFeedback {
                tiezi_id: post_id,
                user_id: 2,
                kind: 0,
                moment: "2025-06-26 12:00:00".into(),
            },
        )
        .await
        .unwrap();
        CommentRepo::create(
            &store,
            NewComment {
                tiezi_id: post_id,
                user_id: 2,
                img_url: "a.png".into(),
                name: "n".into(),
                content: "c".into(),
                moment: "2025-06-26 12:00:00".into(),
            },
        )
        .await
        .unwrap();

        let outcome = PostRepo::delete(&store, post_id).await.unwrap();
        assert!(outcome.affected_rows >= 3);

        assert_eq!(FeedbackRepo::count(&store, post_id, FeedbackKind::Like).await.unwrap(), 0);
        assert_eq!(CommentRepo::count(&store, post_id).await.unwrap(), 0);
    }

    #[tokio::test]
    #[ignore]
    async fn page_is_newest_first_and_label_filtered() {
        let store = scratch_store().await;
        let first = PostRepo::create(&store, new_post(3)).await.unwrap().insert_id as i64;
        let second = PostRepo::create(&store, new_post(3)).await.unwrap().insert_id as i64;

        let page = store.fetch_page(3, 0, 50).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|p| p.id).collect();
        let pos_first = ids.iter().position(|&id| id == first).unwrap();
        let pos_second = ids.iter().position(|&id| id == second).unwrap();
        assert!(pos_second < pos_first, "newer post must come first");
        assert!(page.iter().all(|p| p.label == 3));

        for id in [first, second] {
            PostRepo::delete(&store, id).await.unwrap();
        }
    }
}
