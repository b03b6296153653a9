use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::AppState;

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod integrations;
pub mod pages;
pub mod reports;
pub mod sprints;
pub mod tasks;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .merge(auth::router())
        .merge(tasks::router())
        .merge(sprints::router())
        .merge(reports::router())
        .merge(dashboard::router())
        .merge(pages::router())
        .merge(integrations::router())
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
