//! wall-board/crates/wb-api/src/middleware.rs
//!
//! Request logging and traffic control shared by every route.

use actix_web::middleware::Logger;
use actix_cors::Cors;

/// Standard access logging:
/// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn standard_middleware() -> Logger {
    Logger::default()
}

/// CORS policy: the wall client is served from a different origin, so all
/// origins are allowed with the methods the board actually uses.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_header()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .max_age(3600)
}
