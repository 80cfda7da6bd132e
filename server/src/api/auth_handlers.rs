//! Registration, login, and logout handlers.

use anyhow::Context as _;
use axum::extract::{Form, Multipart, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

use super::{
    AppState, clear_session_cookie, current_or_new_session, escape_html, internal_error_page,
    page, require_user, session_id_from_headers, with_session_cookie,
};
use crate::auth::store::{self, NewUser};
use crate::error::OpError;

fn register_form_page(error: Option<&str>) -> Response {
    let error_html = error
        .map(|e| format!("<p class=\"error\">{}</p>", escape_html(e)))
        .unwrap_or_default();

    page(
        "Register",
        &format!(
            "<h1>Register for Linkdex</h1>{error_html}\
             <form method=\"post\" action=\"/register\" enctype=\"multipart/form-data\">\
             <label>Username <input type=\"text\" name=\"username\" maxlength=\"64\"></label>\
             <label>Password <input type=\"password\" name=\"password\"></label>\
             <label>Website <input type=\"text\" name=\"website\" placeholder=\"optional\"></label>\
             <label>Picture <input type=\"file\" name=\"picture\"></label>\
             <button type=\"submit\">Register</button>\
             </form>"
        ),
    )
    .into_response()
}

pub async fn register_form() -> Response {
    register_form_page(None)
}

pub async fn register_submit(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut username = String::new();
    let mut password = String::new();
    let mut website = String::new();
    let mut picture: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!("malformed registration submission: {}", err);
                return register_form_page(Some("malformed form submission"));
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("picture") => {
                let file_name = field.file_name().map(str::to_string);
                let data = match field.bytes().await {
                    Ok(data) => data,
                    Err(err) => {
                        tracing::warn!("malformed picture upload: {}", err);
                        return register_form_page(Some("malformed picture upload"));
                    }
                };
                if !data.is_empty() {
                    match save_picture(&state, file_name.as_deref(), &data).await {
                        Ok(stored_name) => picture = Some(stored_name),
                        Err(err) => return internal_error_page(err),
                    }
                }
            }
            Some(text_field) => {
                let value = match field.text().await {
                    Ok(value) => value,
                    Err(err) => {
                        tracing::warn!("malformed registration submission: {}", err);
                        return register_form_page(Some("malformed form submission"));
                    }
                };
                match text_field {
                    "username" => username = value,
                    "password" => password = value,
                    "website" => website = value,
                    _ => {}
                }
            }
            None => {}
        }
    }

    let new_user = NewUser {
        username: &username,
        password: &password,
        website: Some(&website),
        picture,
    };

    match store::create_user(&state.pool, new_user).await {
        Ok(user) => {
            tracing::info!("user {} registered", user.username);
            page(
                "Registered",
                &format!(
                    "<h1>Thank you for registering, {}!</h1>\
                     <p><a href=\"/login\">Log in</a> to start adding categories and pages.</p>",
                    escape_html(&user.username)
                ),
            )
            .into_response()
        }
        Err(OpError::Invalid(message)) => {
            tracing::warn!("registration form rejected: {}", message);
            register_form_page(Some(&message))
        }
        Err(OpError::Db(err)) => internal_error_page(err),
    }
}

/// Store an uploaded picture under the media directory with a generated
/// filename, keeping a sanitized extension from the original name.
async fn save_picture(
    state: &AppState,
    file_name: Option<&str>,
    data: &[u8],
) -> anyhow::Result<String> {
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    let stored_name = match extension {
        Some(ext) => format!("{}.{}", cuid2::create_id(), ext),
        None => cuid2::create_id(),
    };

    tokio::fs::write(state.media_dir.join(&stored_name), data)
        .await
        .context("failed to store uploaded picture")?;

    Ok(stored_name)
}

fn login_form_page(error: Option<&str>) -> Response {
    let error_html = error
        .map(|e| format!("<p class=\"error\">{}</p>", escape_html(e)))
        .unwrap_or_default();

    page(
        "Login",
        &format!(
            "<h1>Login to Linkdex</h1>{error_html}\
             <form method=\"post\" action=\"/login\">\
             <label>Username <input type=\"text\" name=\"username\"></label>\
             <label>Password <input type=\"password\" name=\"password\"></label>\
             <button type=\"submit\">Login</button>\
             </form>\
             <p>Not registered? <a href=\"/register\">Register here</a>.</p>"
        ),
    )
    .into_response()
}

pub async fn login_form() -> Response {
    login_form_page(None)
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let username = form.username.trim();

    let user = match store::verify_login(&state.pool, username, &form.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!("failed login attempt for '{}'", username);
            return login_form_page(Some("invalid username or password"));
        }
        Err(err) => return internal_error_page(err),
    };

    let (session, created) = match current_or_new_session(&state, &headers) {
        Ok(v) => v,
        Err(err) => return internal_error_page(err),
    };
    match state.sessions.bind_user(&session.id, &user.id) {
        Ok(true) => {}
        Ok(false) => return internal_error_page("session disappeared during login"),
        Err(err) => return internal_error_page(err),
    }

    tracing::info!("user {} logged in", user.username);
    with_session_cookie(&state, created, &session.id, Redirect::to("/").into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = require_user(&state, &headers).await {
        return response;
    }

    if let Some(session_id) = session_id_from_headers(&state.cookie_name, &headers) {
        if let Err(err) = state.sessions.delete_session(&session_id) {
            return internal_error_page(err);
        }
    }

    clear_session_cookie(&state, Redirect::to("/").into_response())
}
