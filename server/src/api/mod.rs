//! HTTP layer: shared state, session plumbing, and page helpers.

pub mod auth_handlers;
pub mod handlers;
pub mod server;

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::auth::{Session, SessionManager, UserRecord, store};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub sessions: Arc<SessionManager>,
    pub media_dir: PathBuf,
    pub cookie_name: String,
}

/// Pull the session id out of the Cookie header, if present.
pub(crate) fn session_id_from_headers(cookie_name: &str, headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == cookie_name).then(|| value.to_string())
    })
}

/// Resolve the request's session, creating a fresh one when the cookie
/// is missing or stale. The bool reports whether a new session (and so
/// a Set-Cookie) is needed.
pub(crate) fn current_or_new_session(
    state: &AppState,
    headers: &HeaderMap,
) -> anyhow::Result<(Session, bool)> {
    if let Some(id) = session_id_from_headers(&state.cookie_name, headers) {
        if let Some(session) = state.sessions.get_session(&id)? {
            return Ok((session, false));
        }
    }

    Ok((state.sessions.create_session(Utc::now())?, true))
}

pub(crate) fn with_session_cookie(
    state: &AppState,
    created: bool,
    session_id: &str,
    mut response: Response,
) -> Response {
    if !created {
        return response;
    }

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        state.cookie_name, session_id
    );
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(err) => tracing::error!("failed to build session cookie header: {}", err),
    }
    response
}

pub(crate) fn clear_session_cookie(state: &AppState, mut response: Response) -> Response {
    let cookie = format!("{}=; Path=/; HttpOnly; Max-Age=0", state.cookie_name);
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(err) => tracing::error!("failed to build session cookie header: {}", err),
    }
    response
}

/// Auth guard: resolve the logged-in user or produce the response the
/// handler should return instead (a redirect to the login page).
pub(crate) async fn require_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<UserRecord, Response> {
    let Some(session_id) = session_id_from_headers(&state.cookie_name, headers) else {
        return Err(Redirect::to("/login").into_response());
    };

    let user_id = match state.sessions.user_id(&session_id) {
        Ok(Some(id)) => id,
        Ok(None) => return Err(Redirect::to("/login").into_response()),
        Err(err) => return Err(internal_error_page(err)),
    };

    match store::fetch_user_by_id(&state.pool, &user_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(Redirect::to("/login").into_response()),
        Err(err) => Err(internal_error_page(err)),
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Wrap a body fragment in the shared page chrome.
pub(crate) fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title} - Linkdex</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
            max-width: 720px;
            margin: 40px auto;
            padding: 0 16px;
            color: #1f2937;
        }}
        nav a {{ margin-right: 12px; }}
        form label {{ display: block; margin-top: 12px; }}
        .error {{ color: #b91c1c; }}
        .muted {{ color: #6b7280; }}
    </style>
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/about">About</a>
        <a href="/category/add">Add Category</a>
        <a href="/register">Register</a>
        <a href="/login">Login</a>
        <a href="/logout">Logout</a>
    </nav>
    {body}
</body>
</html>"#
    ))
}

pub(crate) fn internal_error_page(err: impl std::fmt::Display) -> Response {
    tracing::error!("internal error: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        page(
            "Error",
            "<h1>Something went wrong</h1><p>Please try again later.</p>",
        ),
    )
        .into_response()
}
