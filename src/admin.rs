use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::{
    auth::{
        jwt::AuthUser,
        repo::{LoginMethod, Role, User},
    },
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/login-stats", get(login_stats))
}

/// Counts of all users per login method.
#[derive(Debug, Serialize)]
pub struct LoginStats {
    pub manual: i64,
    pub google: i64,
    pub onetap: i64,
}

#[instrument(skip(state))]
pub async fn login_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<LoginStats>, ApiError> {
    let requester = User::find_by_id(&state.db, user_id).await?;
    match requester {
        Some(user) if user.role == Role::Admin => {}
        _ => {
            warn!(user_id = %user_id, "login-stats denied");
            return Err(ApiError::AdminOnly);
        }
    }

    let manual = User::count_by_login_method(&state.db, LoginMethod::Manual).await?;
    let google = User::count_by_login_method(&state.db, LoginMethod::GoogleOauth).await?;
    let onetap = User::count_by_login_method(&state.db, LoginMethod::GoogleOnetap).await?;

    Ok(Json(LoginStats {
        manual,
        google,
        onetap,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialize_with_short_keys() {
        let json = serde_json::to_string(&LoginStats {
            manual: 3,
            google: 2,
            onetap: 1,
        })
        .unwrap();
        assert_eq!(json, r#"{"manual":3,"google":2,"onetap":1}"#);
    }
}
