use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    links::{
        dto::{CreateLinkRequest, CreatedLinkResponse, NextLinkResponse},
        repo::Link,
    },
    state::AppState,
};

pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link))
        .route("/links/next", get(next_link))
}

#[instrument(skip(state, payload))]
pub async fn create_link(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<Json<CreatedLinkResponse>, ApiError> {
    let link = Link::create(&state.db, &payload.url, payload.link_type, Some(user_id)).await?;
    info!(link_id = %link.id, user_id = %user_id, "link uploaded");
    Ok(Json(CreatedLinkResponse {
        ok: true,
        link: link.into(),
    }))
}

#[instrument(skip(state))]
pub async fn next_link(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<NextLinkResponse>, ApiError> {
    let link = Link::next_unseen(&state.db, user_id).await?;
    match &link {
        Some(link) => info!(link_id = %link.id, user_id = %user_id, "next link served"),
        None => info!(user_id = %user_id, "rotation exhausted"),
    }
    Ok(Json(NextLinkResponse {
        link: link.map(Into::into),
    }))
}
