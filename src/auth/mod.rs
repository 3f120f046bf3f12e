use crate::state::AppState;
use axum::Router;

mod dto;
pub mod extractors;
pub mod handlers;
pub mod password;
pub mod services;
pub mod token;

pub fn router() -> Router<AppState> {
    handlers::token_routes()
}
