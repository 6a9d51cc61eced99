use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
mod youtube;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::link_routes())
}
