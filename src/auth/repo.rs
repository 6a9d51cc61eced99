use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;

/// Closed set of roles; the admin surface checks this explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Channel through which an account last authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "login_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoginMethod {
    Manual,
    GoogleOauth,
    GoogleOnetap,
}

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    // NULL marks a passwordless account
    pub password_hash: Option<String>,
    pub role: Role,
    pub login_method: LoginMethod,
    pub created_at: OffsetDateTime,
    pub last_login_at: Option<OffsetDateTime>,
}

pub struct NewUser<'a> {
    pub username: Option<&'a str>,
    pub display_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub role: Role,
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, display_name, email, phone, password_hash,
                   role, login_method, created_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, display_name, email, phone, password_hash,
                   role, login_method, created_at, last_login_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, display_name, email, phone, password_hash,
                   role, login_method, created_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_phone(db: &PgPool, phone: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, display_name, email, phone, password_hash,
                   role, login_method, created_at, last_login_at
            FROM users
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(db: &PgPool, new: &NewUser<'_>) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, display_name, email, phone, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, display_name, email, phone, password_hash,
                      role, login_method, created_at, last_login_at
            "#,
        )
        .bind(new.username)
        .bind(new.display_name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.password_hash)
        .bind(new.role)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Set the last-login timestamp, returning the updated record.
    pub async fn touch_last_login(db: &PgPool, id: Uuid) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET last_login_at = now()
            WHERE id = $1
            RETURNING id, username, display_name, email, phone, password_hash,
                      role, login_method, created_at, last_login_at
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn count_by_login_method(db: &PgPool, method: LoginMethod) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM users WHERE login_method = $1"#,
        )
        .bind(method)
        .fetch_one(db)
        .await?;
        Ok(count)
    }
}

/// Create the configured admin account once, at startup, if absent.
pub async fn ensure_bootstrap_admin(db: &PgPool, admin: &BootstrapAdmin) -> anyhow::Result<()> {
    if User::find_by_username(db, &admin.username).await?.is_some() {
        info!(username = %admin.username, "admin user already exists");
        return Ok(());
    }
    let hash = hash_password(&admin.password)?;
    let user = User::create(
        db,
        &NewUser {
            username: Some(&admin.username),
            display_name: Some("Admin"),
            email: None,
            phone: None,
            password_hash: Some(&hash),
            role: Role::Admin,
        },
    )
    .await?;
    info!(user_id = %user.id, username = %admin.username, "admin user created");
    Ok(())
}
