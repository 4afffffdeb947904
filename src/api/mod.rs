pub mod handlers;

pub use handlers::*;

use crate::service::ProjectService;
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

/// 构建全部路由
pub fn router(service: Arc<ProjectService>) -> Router {
    let project_routes = Router::new()
        .route("/api/projects/:project_id/items", get(list_items).post(add_item))
        .route("/api/projects/:project_id/items/:item_id", patch(update_item))
        .route(
            "/api/projects/:project_id/items/:item_id/approve",
            post(approve_for_client),
        )
        .route(
            "/api/projects/:project_id/items/:item_id/vendor",
            post(select_vendor),
        )
        .route("/api/projects/:project_id/summary", get(summary))
        .route("/api/projects/:project_id/budget", put(set_budget))
        .route("/api/projects/:project_id/comparison", get(comparison))
        .route("/api/projects/:project_id/import", post(import_csv))
        .route("/api/projects/:project_id/export", get(export_csv))
        .route("/api/projects/:project_id/payment", post(payment_request))
        .with_state(service);

    Router::new()
        .route("/health", get(health_check))
        .merge(project_routes)
        .layer(ServiceBuilder::new())
}
