use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::report_text))
        .route("/api/routines", get(handlers::list_routines).post(handlers::create_routine))
        .route(
            "/api/routines/:id",
            get(handlers::get_routine).delete(handlers::delete_routine),
        )
        .route("/api/routines/:id/attempts", post(handlers::log_attempt))
        .route("/api/analytics", get(handlers::get_analytics))
        .route("/api/heatmap", get(handlers::get_heatmap))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/report", get(handlers::report_text))
        .with_state(state)
}
