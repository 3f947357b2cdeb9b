//! # wb-api Handlers
//!
//! Coordinates the flow between HTTP requests and the core services.
//!
//! The wire contract is envelope-based: HTTP status is always 200 and the
//! body carries the logical `code`. Validation failures echo the received
//! payload; store faults carry the offending statement and parameters under
//! `detail`.

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};

use wb_core::error::AppError;
use wb_core::feed::{FeedService, ALL_LABELS, INVALID_PAGINATION};
use wb_core::mutate::{CommentDraft, FeedbackDraft, MutationService, PostDraft, MISSING_FIELDS};
use wb_core::traits::CommentRepo;

/// State shared across all workers.
pub struct AppState {
    pub feed: FeedService,
    pub mutations: MutationService,
    pub comments: Arc<dyn CommentRepo>,
}

fn ok(messages: impl serde::Serialize) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "code": 200, "messages": messages }))
}

fn missing_fields(received: &Value) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "code": 400,
        "messages": MISSING_FIELDS,
        "received": received,
    }))
}

fn rejected(err: AppError, received: &Value) -> HttpResponse {
    match err {
        AppError::InvalidParameters(message) => HttpResponse::Ok().json(json!({
            "code": 400,
            "messages": message,
            "received": received,
        })),
        other => failure(other),
    }
}

fn failure(err: AppError) -> HttpResponse {
    let mut body = json!({ "code": 400, "messages": err.to_string() });
    if let Some(detail) = err.detail() {
        body["detail"] = detail;
    }
    HttpResponse::Ok().json(body)
}

fn id_of(body: &Value) -> Option<i64> {
    body.get("id").and_then(Value::as_i64)
}

pub async fn create_tiezi(state: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    let Ok(draft) = serde_json::from_value::<PostDraft>(body.0.clone()) else {
        return missing_fields(&body.0);
    };
    match state.mutations.create_post(draft).await {
        Ok(outcome) => ok(outcome),
        Err(err) => rejected(err, &body.0),
    }
}

pub async fn create_feedback(state: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    let Ok(draft) = serde_json::from_value::<FeedbackDraft>(body.0.clone()) else {
        return missing_fields(&body.0);
    };
    match state.mutations.create_feedback(draft).await {
        Ok(outcome) => ok(outcome),
        Err(err) => rejected(err, &body.0),
    }
}

pub async fn create_comment(state: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    let Ok(draft) = serde_json::from_value::<CommentDraft>(body.0.clone()) else {
        return missing_fields(&body.0);
    };
    match state.mutations.create_comment(draft).await {
        Ok(outcome) => ok(outcome),
        Err(err) => rejected(err, &body.0),
    }
}

pub async fn delete_tiezi(state: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    let Some(id) = id_of(&body.0) else {
        return missing_fields(&body.0);
    };
    match state.mutations.delete_post(id).await {
        Ok(outcome) => ok(outcome),
        Err(err) => failure(err),
    }
}

pub async fn delete_feedback(state: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    let Some(id) = id_of(&body.0) else {
        return missing_fields(&body.0);
    };
    match state.mutations.delete_feedback(id).await {
        Ok(outcome) => ok(outcome),
        Err(err) => failure(err),
    }
}

pub async fn delete_comment(state: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    let Some(id) = id_of(&body.0) else {
        return missing_fields(&body.0);
    };
    match state.mutations.delete_comment(id).await {
        Ok(outcome) => ok(outcome),
        Err(err) => failure(err),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    #[serde(default = "all_labels")]
    pub label: i32,
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub user_id: Option<i64>,
}

fn all_labels() -> i32 {
    ALL_LABELS
}

fn first_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

fn invalid_pagination(body: &Value) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "code": 400,
        "messages": INVALID_PAGINATION,
        "detail": { "page": body.get("page"), "pageSize": body.get("pageSize") },
    }))
}

/// The paginated, enriched feed.
pub async fn select_tiezi(state: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    let Ok(query) = serde_json::from_value::<FeedQuery>(body.0.clone()) else {
        return invalid_pagination(&body.0);
    };
    match state
        .feed
        .list_feed(query.label, query.page, query.page_size, query.user_id)
        .await
    {
        // The empty page keeps a fixed shape so clients can render
        // unconditionally.
        Ok(page) if page.is_empty() => ok(json!({
            "data": [],
            "like": 0,
            "report": 0,
            "revoke": 0,
            "isLike": 0,
            "commentCount": 0,
        })),
        Ok(page) => ok(json!({ "data": page })),
        Err(AppError::InvalidParameters(_)) => invalid_pagination(&body.0),
        Err(err) => failure(err),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    pub tiezi_id: Option<i64>,
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

/// One page of a post's comments, newest first.
pub async fn select_comment(state: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    let Ok(query) = serde_json::from_value::<CommentQuery>(body.0.clone()) else {
        return invalid_pagination(&body.0);
    };
    let Some(tiezi_id) = query.tiezi_id else {
        return missing_fields(&body.0);
    };
    if query.page < 1 || query.page_size < 1 {
        return invalid_pagination(&body.0);
    }
    let Some(offset) = (query.page - 1).checked_mul(query.page_size) else {
        return invalid_pagination(&body.0);
    };
    match state
        .comments
        .list_for_post(tiezi_id, offset, query.page_size)
        .await
    {
        Ok(comments) => ok(comments),
        Err(err) => failure(err),
    }
}

/// A single comment by id, returned as a (possibly empty) row set.
pub async fn select_comment_id(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> impl Responder {
    let Some(id) = id_of(&body.0) else {
        return missing_fields(&body.0);
    };
    match state.comments.get(id).await {
        Ok(comment) => ok(comment.into_iter().collect::<Vec<_>>()),
        Err(err) => failure(err),
    }
}

/// Client address echo, used by the frontend for first-visit registration.
pub async fn client_ip(req: HttpRequest) -> impl Responder {
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default();
    HttpResponse::Ok().json(json!({ "code": 200, "ip": ip }))
}
