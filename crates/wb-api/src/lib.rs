//! # wb-api
//!
//! The web routing and orchestration layer for wall-board.

pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Configures the message-wall routes.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the API under different paths if needed.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/createTiezi", web::post().to(handlers::create_tiezi))
            .route("/createFeedback", web::post().to(handlers::create_feedback))
            .route("/createComment", web::post().to(handlers::create_comment))
            .route("/deleteTiezi", web::post().to(handlers::delete_tiezi))
            .route("/deleteComment", web::post().to(handlers::delete_comment))
            .route("/deleteFeedback", web::post().to(handlers::delete_feedback))
            .route("/selectTiezi", web::post().to(handlers::select_tiezi))
            .route("/selectComment", web::post().to(handlers::select_comment))
            .route("/selectCommentId", web::post().to(handlers::select_comment_id))
            .route("/ip", web::get().to(handlers::client_ip)),
    );
}
