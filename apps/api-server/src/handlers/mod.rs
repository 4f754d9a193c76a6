//! HTTP handlers and route configuration.

mod events;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/categories", web::get().to(posts::categories))
            .route("/events", web::get().to(events::subscribe))
            .route("/posts", web::get().to(posts::list))
            .route("/posts", web::post().to(posts::create))
            // Registered ahead of /posts/{id} so "search" is not read as an id.
            .route("/posts/search", web::get().to(posts::search))
            .route("/posts/{id}", web::get().to(posts::get))
            .route("/posts/{id}", web::put().to(posts::update))
            .route("/posts/{id}", web::delete().to(posts::remove)),
    );
}
