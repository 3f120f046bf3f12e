use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
mod validation;

pub fn router(max_picture_bytes: u64) -> Router<AppState> {
    Router::new()
        .merge(handlers::user_routes())
        .merge(handlers::picture_routes(max_picture_bytes))
}
