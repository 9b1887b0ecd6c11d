use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/users/:user_id/habits/:habit_id/complete",
            post(handlers::complete_habit_form),
        )
        .route(
            "/api/users/:user_id/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route(
            "/api/users/:user_id/habits/:habit_id",
            patch(handlers::update_habit).delete(handlers::delete_habit),
        )
        .route(
            "/api/users/:user_id/habits/:habit_id/complete",
            post(handlers::complete_habit),
        )
        .route("/api/users/:user_id/streaks", get(handlers::get_streaks))
        .with_state(state)
}
