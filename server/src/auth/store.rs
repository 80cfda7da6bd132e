//! SQLite-backed user and profile persistence.

use sqlx::SqlitePool;

use super::{ProfileRecord, UserRecord, hash_password, verify_password};
use crate::error::OpError;
use crate::validation::url::normalize_link_url;

const MAX_USERNAME_LEN: usize = 64;

pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub website: Option<&'a str>,
    /// Media-directory filename of an already-saved picture upload
    pub picture: Option<String>,
}

/// Create a user together with its one-to-one profile row.
pub async fn create_user(pool: &SqlitePool, new_user: NewUser<'_>) -> Result<UserRecord, OpError> {
    let username = new_user.username.trim();
    if username.is_empty() {
        return Err(OpError::invalid("username cannot be empty"));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(OpError::invalid(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(OpError::invalid("username cannot contain whitespace"));
    }
    if new_user.password.is_empty() {
        return Err(OpError::invalid("password cannot be empty"));
    }

    let website = match new_user.website.map(str::trim) {
        Some("") | None => None,
        Some(raw) => Some(normalize_link_url(raw).map_err(OpError::invalid)?),
    };

    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE username = ? LIMIT 1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    if exists.is_some() {
        return Err(OpError::invalid("username is already taken"));
    }

    let id = cuid2::create_id();
    let password_hash = hash_password(new_user.password);

    let mut tx = pool.begin().await?;
    sqlx::query("INSERT INTO users (id, username, password_hash) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(username)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT INTO profiles (user_id, website, picture) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(&website)
        .bind(&new_user.picture)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    metrics::counter!("linkdex_users_registered_total").increment(1);

    Ok(UserRecord {
        id,
        username: username.to_string(),
        password_hash,
    })
}

pub async fn fetch_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(
        "SELECT id, username, password_hash FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_user_by_id(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>("SELECT id, username, password_hash FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_profile(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Option<ProfileRecord>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRecord>(
        "SELECT user_id, website, picture FROM profiles WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Returns the user when the credentials match, None otherwise. Unknown
/// usernames and wrong passwords are indistinguishable to the caller.
pub async fn verify_login(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<UserRecord>, sqlx::Error> {
    match fetch_user_by_username(pool, username).await? {
        Some(user) if verify_password(password, &user.password_hash) => Ok(Some(user)),
        _ => Ok(None),
    }
}
