use axum::Router;

pub mod health;

/// Domain routes. Docs, tracing and the fallback come from `create_router`.
pub fn routes(state: &crate::state::AppState) -> Router {
    domain_reviews::handlers::router(state.uow.clone())
}

/// `GET /ready` with a real database probe.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
