//! # wall-board Binary
//!
//! The entry point that assembles the application based on compile-time
//! features: one storage plugin, the core services, and the HTTP layer.

use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use wb_api::handlers::AppState;
use wb_api::{configure_routes, middleware};
use wb_core::feed::FeedService;
use wb_core::mutate::MutationService;
use wb_core::stats::StatAggregator;

#[cfg(feature = "db-mysql")]
use wb_db_mysql::MySqlWallStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "mysql://root@127.0.0.1:3306/wall".into());

    // 1. Initialize the storage implementation. The pool lives here and is
    //    injected everywhere; nothing else owns connections.
    #[cfg(feature = "db-mysql")]
    let store = Arc::new(
        MySqlWallStore::connect(&database_url)
            .await
            .expect("Failed to connect to MySQL"),
    );
    #[cfg(feature = "db-mysql")]
    store
        .init_schema()
        .await
        .expect("Failed to prepare the schema");

    // 2. Assemble the core services around the shared store.
    let state = web::Data::new(AppState {
        feed: FeedService::new(
            store.clone(),
            StatAggregator::new(store.clone(), store.clone()),
        ),
        mutations: MutationService::new(store.clone(), store.clone(), store.clone()),
        comments: store,
    });

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());
    log::info!("🚀 wall-board starting on http://{bind}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .configure(configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
