//! Content HTTP handlers: index, about, category browsing and creation.

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Utc;
use serde::Deserialize;

use super::{
    AppState, current_or_new_session, escape_html, internal_error_page, page, require_user,
    with_session_cookie,
};
use crate::category::{self, CategoryRecord};
use crate::error::OpError;
use crate::page as pages;

/// Index and top-page listings show at most this many entries.
const TOP_LIST_LIMIT: i64 = 5;

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let categories = match category::db::top_categories(&state.pool, TOP_LIST_LIMIT).await {
        Ok(categories) => categories,
        Err(err) => return internal_error_page(err),
    };
    let top_pages = match pages::db::top_pages(&state.pool, TOP_LIST_LIMIT).await {
        Ok(top_pages) => top_pages,
        Err(err) => return internal_error_page(err),
    };

    let (session, created) = match current_or_new_session(&state, &headers) {
        Ok(v) => v,
        Err(err) => return internal_error_page(err),
    };
    let visits = match state.sessions.record_visit(&session.id, Utc::now()) {
        Ok(Some(visits)) => visits,
        Ok(None) => session.visits,
        Err(err) => return internal_error_page(err),
    };

    let category_items = if categories.is_empty() {
        "<li>There are no categories present.</li>".to_string()
    } else {
        categories
            .iter()
            .map(|c| {
                format!(
                    "<li><a href=\"/category/{}\">{}</a> <span class=\"muted\">({} likes)</span></li>",
                    c.slug,
                    escape_html(&c.name),
                    c.likes
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let page_items = if top_pages.is_empty() {
        "<li>There are no pages present.</li>".to_string()
    } else {
        top_pages
            .iter()
            .map(|p| {
                format!(
                    "<li><a href=\"{}\">{}</a> <span class=\"muted\">({} views)</span></li>",
                    escape_html(&p.url),
                    escape_html(&p.title),
                    p.views
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let body = format!(
        "<h1>Linkdex</h1>\
         <h2>Most Liked Categories</h2>\n<ul>{category_items}</ul>\
         <h2>Most Viewed Pages</h2>\n<ul>{page_items}</ul>\
         <p class=\"muted\">Visits: {visits}</p>"
    );

    with_session_cookie(&state, created, &session.id, page("Home", &body).into_response())
}

pub async fn about(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session, created) = match current_or_new_session(&state, &headers) {
        Ok(v) => v,
        Err(err) => return internal_error_page(err),
    };
    let visits = match state.sessions.record_visit(&session.id, Utc::now()) {
        Ok(Some(visits)) => visits,
        Ok(None) => session.visits,
        Err(err) => return internal_error_page(err),
    };

    let body = format!(
        "<h1>About Linkdex</h1>\
         <p>Linkdex is a directory of categorized links. Browse the categories, \
         or register to add your own.</p>\
         <p class=\"muted\">Visits: {visits}</p>"
    );

    with_session_cookie(&state, created, &session.id, page("About", &body).into_response())
}

pub async fn show_category(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let category = match category::db::fetch_category_by_slug(&state.pool, &slug).await {
        Ok(category) => category,
        Err(err) => return internal_error_page(err),
    };

    let Some(category) = category else {
        return unknown_category_page();
    };

    if let Err(err) = category::db::bump_views(&state.pool, &category.id).await {
        return internal_error_page(err);
    }

    let category_pages = match pages::db::pages_for_category(&state.pool, &category.id).await {
        Ok(category_pages) => category_pages,
        Err(err) => return internal_error_page(err),
    };

    let page_items = if category_pages.is_empty() {
        "<p><strong>No pages currently in category.</strong></p>".to_string()
    } else {
        let items = category_pages
            .iter()
            .map(|p| {
                format!(
                    "<li><a href=\"{}\">{}</a> <span class=\"muted\">({} views)</span></li>",
                    escape_html(&p.url),
                    escape_html(&p.title),
                    p.views
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("<ul>{items}</ul>")
    };

    let name = escape_html(&category.name);
    let body = format!(
        "<h1>{name}</h1>\
         <p class=\"muted\">{views} views &middot; {likes} likes</p>\
         <form method=\"post\" action=\"/category/{slug}/like\">\
         <button type=\"submit\">Like {name}</button></form>\
         {page_items}\
         <p><a href=\"/category/{slug}/page/add\">Add a Page</a></p>",
        views = category.views + 1,
        likes = category.likes,
        slug = category.slug,
    );

    page(&category.name, &body).into_response()
}

fn unknown_category_page() -> Response {
    page(
        "Unknown Category",
        "<h1>Unknown Category</h1><p>The specified category does not exist.</p>",
    )
    .into_response()
}

#[derive(Deserialize)]
pub struct CategoryForm {
    pub name: String,
}

fn category_form_page(error: Option<&str>) -> Response {
    let error_html = error
        .map(|e| format!("<p class=\"error\">{}</p>", escape_html(e)))
        .unwrap_or_default();

    page(
        "Add Category",
        &format!(
            "<h1>Add a Category</h1>{error_html}\
             <form method=\"post\" action=\"/category/add\">\
             <label>Name <input type=\"text\" name=\"name\" maxlength=\"128\"></label>\
             <button type=\"submit\">Create Category</button>\
             </form>"
        ),
    )
    .into_response()
}

pub async fn add_category_form(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = require_user(&state, &headers).await {
        return response;
    }
    category_form_page(None)
}

pub async fn add_category_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CategoryForm>,
) -> Response {
    if let Err(response) = require_user(&state, &headers).await {
        return response;
    }

    match category::mutations::create_category(&state.pool, &form.name).await {
        Ok(category) => {
            tracing::info!("category '{}' created with slug '{}'", category.name, category.slug);
            Redirect::to("/").into_response()
        }
        Err(OpError::Invalid(message)) => {
            tracing::warn!("category form rejected: {}", message);
            category_form_page(Some(&message))
        }
        Err(OpError::Db(err)) => internal_error_page(err),
    }
}

#[derive(Deserialize)]
pub struct PageForm {
    pub title: String,
    pub url: String,
}

fn page_form_page(category: &CategoryRecord, error: Option<&str>) -> Response {
    let error_html = error
        .map(|e| format!("<p class=\"error\">{}</p>", escape_html(e)))
        .unwrap_or_default();

    page(
        "Add Page",
        &format!(
            "<h1>Add a Page to {name}</h1>{error_html}\
             <form method=\"post\" action=\"/category/{slug}/page/add\">\
             <label>Title <input type=\"text\" name=\"title\" maxlength=\"128\"></label>\
             <label>URL <input type=\"text\" name=\"url\"></label>\
             <button type=\"submit\">Create Page</button>\
             </form>",
            name = escape_html(&category.name),
            slug = category.slug,
        ),
    )
    .into_response()
}

pub async fn add_page_form(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = require_user(&state, &headers).await {
        return response;
    }

    match category::db::fetch_category_by_slug(&state.pool, &slug).await {
        Ok(Some(category)) => page_form_page(&category, None),
        Ok(None) => unknown_category_page(),
        Err(err) => internal_error_page(err),
    }
}

pub async fn add_page_submit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Form(form): Form<PageForm>,
) -> Response {
    if let Err(response) = require_user(&state, &headers).await {
        return response;
    }

    let category = match category::db::fetch_category_by_slug(&state.pool, &slug).await {
        Ok(Some(category)) => category,
        Ok(None) => return unknown_category_page(),
        Err(err) => return internal_error_page(err),
    };

    match pages::mutations::create_page(&state.pool, &category.id, &form.title, &form.url).await {
        Ok(created) => {
            tracing::info!("page '{}' added to category '{}'", created.title, category.slug);
            Redirect::to(&format!("/category/{}", category.slug)).into_response()
        }
        Err(OpError::Invalid(message)) => {
            tracing::warn!("page form rejected: {}", message);
            page_form_page(&category, Some(&message))
        }
        Err(OpError::Db(err)) => internal_error_page(err),
    }
}

/// Increment a category's like counter; responds with the new count.
pub async fn like_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = require_user(&state, &headers).await {
        return response;
    }

    let category = match category::db::fetch_category_by_slug(&state.pool, &slug).await {
        Ok(Some(category)) => category,
        Ok(None) => return (StatusCode::NOT_FOUND, "category not found").into_response(),
        Err(err) => return internal_error_page(err),
    };

    match category::db::add_like(&state.pool, &category.id).await {
        Ok(likes) => likes.to_string().into_response(),
        Err(err) => internal_error_page(err),
    }
}

pub async fn restricted(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match require_user(&state, &headers).await {
        Ok(user) => page(
            "Restricted",
            &format!(
                "<h1>Restricted Page</h1>\
                 <p>Since you're logged in, {}, you can see this text!</p>",
                escape_html(&user.username)
            ),
        )
        .into_response(),
        Err(response) => response,
    }
}
