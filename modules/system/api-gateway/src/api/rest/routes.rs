use axum::Router;
use axum::routing::{get, post};

use crate::api::rest::handlers;
use crate::state::AppState;

/// Every public path of the gateway, with the 404 problem as fallback.
#[must_use]
pub fn router(state: AppState) -> Router {
    let taste_graph = Router::new()
        .route("/search", get(handlers::search))
        .route("/insights", post(handlers::insights))
        .route("/recommendations", get(handlers::recommendations))
        .route("/antitheses", post(handlers::antitheses))
        .route("/affinity-cluster", get(handlers::affinity_cluster))
        .route("/cross-domain-affinity", get(handlers::cross_domain_affinity));

    let zesty = Router::new()
        .route("/generate-cards", post(handlers::generate_cards))
        .route("/onboarding-report", post(handlers::onboarding_report))
        .route("/growth-reflection", post(handlers::growth_reflection))
        .route("/find-nemesis", post(handlers::find_nemesis))
        .route("/challenge-task", post(handlers::challenge_task));

    Router::new()
        .route("/api/health", get(handlers::health))
        .nest("/api/taste-graph", taste_graph)
        .route("/api/text-gen/generate", post(handlers::generate))
        .nest("/api/zesty", zesty)
        .fallback(handlers::not_found)
        .with_state(state)
}
