use crate::state::AppState;
use axum::Router;

pub mod category;
pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    handlers::listing_routes()
}
