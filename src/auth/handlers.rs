use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MeResponse, PublicUser, SignupRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::{NewUser, Role, User},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trim a field and treat the empty string as absent.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = clean(payload.email).map(|e| e.to_lowercase());
    let phone = clean(payload.phone);
    let username = clean(payload.username);
    // empty password means a passwordless signup, not an empty credential
    let password = payload.password.filter(|p| !p.is_empty());

    if username.is_none() && email.is_none() && phone.is_none() {
        warn!("signup without any identifier");
        return Err(ApiError::MissingIdentifier);
    }

    if let Some(email) = &email {
        if !is_valid_email(email) {
            warn!(email = %email, "invalid email");
            return Err(ApiError::InvalidEmail);
        }
        if User::find_by_email(&state.db, email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(ApiError::UserExists);
        }
    }

    let password_hash = match &password {
        Some(plain) => Some(hash_password(plain)?),
        None => None,
    };

    // Fast signups may omit the display name; fall back to email, then username
    let display_name = clean(payload.display_name)
        .or_else(|| email.clone())
        .or_else(|| username.clone());

    let user = User::create(
        &state.db,
        &NewUser {
            username: username.as_deref(),
            display_name: display_name.as_deref(),
            email: email.as_deref(),
            phone: phone.as_deref(),
            password_hash: password_hash.as_deref(),
            role: Role::User,
        },
    )
    .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user signed up");
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let username = clean(payload.username);
    let email = clean(payload.email).map(|e| e.to_lowercase());
    let phone = clean(payload.phone);

    // First match wins: username, then email, then phone
    let mut user = None;
    if let Some(username) = &username {
        user = User::find_by_username(&state.db, username).await?;
    }
    if user.is_none() {
        if let Some(email) = &email {
            user = User::find_by_email(&state.db, email).await?;
        }
    }
    if user.is_none() {
        if let Some(phone) = &phone {
            user = User::find_by_phone(&state.db, phone).await?;
        }
    }
    let user = user.ok_or_else(|| {
        warn!("login for unknown user");
        ApiError::UserNotFound
    })?;

    // Passwordless accounts accept any login that resolves to them
    if let Some(hash) = &user.password_hash {
        let supplied = payload.password.as_deref().unwrap_or("");
        if !verify_password(supplied, hash)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ApiError::InvalidCredentials);
        }
    }

    let user = User::touch_last_login(&state.db, user.id).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    Ok(Json(MeResponse { user: user.into() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
    }

    #[test]
    fn email_regex_rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    #[test]
    fn clean_drops_blank_fields() {
        assert_eq!(clean(Some("  alice  ".into())), Some("alice".to_string()));
        assert_eq!(clean(Some("   ".into())), None);
        assert_eq!(clean(None), None);
    }

    #[test]
    fn display_name_falls_back_to_email_then_username() {
        let pick = |name: Option<&str>, email: Option<&str>, username: Option<&str>| {
            clean(name.map(String::from))
                .or_else(|| email.map(String::from))
                .or_else(|| username.map(String::from))
        };
        assert_eq!(pick(Some("Alice"), Some("a@b.co"), Some("al")), Some("Alice".into()));
        assert_eq!(pick(None, Some("a@b.co"), Some("al")), Some("a@b.co".into()));
        assert_eq!(pick(None, None, Some("al")), Some("al".into()));
    }
}
