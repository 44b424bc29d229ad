use crate::handlers;
use crate::offline;
use crate::proxy;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/records", post(handlers::add_record_form))
        .route("/records/:id/delete", post(handlers::delete_record_form))
        .route("/sw.js", get(offline::service_worker))
        .route("/api/records", get(handlers::list_records).post(handlers::create_record))
        .route("/api/records/:id", delete(handlers::delete_record))
        .route("/api/leaderboard", get(handlers::get_leaderboard))
        .route("/api/history", get(handlers::get_history))
        .route("/api/session", get(handlers::get_session))
        .route("/api/bins", post(proxy::create_bin).fallback(proxy::method_not_allowed))
        .route(
            "/api/bins/:id",
            get(proxy::read_bin)
                .put(proxy::replace_bin)
                .fallback(proxy::method_not_allowed),
        )
        .layer(middleware::from_fn(offline::no_store_for_api))
        .with_state(state)
}
