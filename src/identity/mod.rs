use axum::Router;

use crate::state::AppState;

pub mod cookies;
pub mod dto;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod tokens;

pub fn router() -> Router<AppState> {
    handlers::identity_routes()
}
