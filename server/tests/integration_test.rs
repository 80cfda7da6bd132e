//! End-to-end tests against an in-memory database: query ordering,
//! slug handling, and the session/auth behavior of the HTTP routes.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use server::api::{AppState, server::build_router};
use server::auth::store::{self, NewUser};
use server::auth::SessionManager;
use server::category::{db as category_db, mutations as category_mutations};
use server::page::{db as page_db, mutations as page_mutations};
use server::test_helpers;
use tempfile::TempDir;
use tower::util::ServiceExt;

async fn test_state() -> (AppState, TempDir) {
    let pool = test_helpers::create_test_pool().await.unwrap();
    let media_dir = TempDir::new().unwrap();

    let state = AppState {
        pool,
        sessions: Arc::new(SessionManager::new()),
        media_dir: media_dir.path().to_path_buf(),
        cookie_name: "linkdex_session".to_string(),
    };

    (state, media_dir)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Log a fresh session in as `user_id` and return its Cookie header value.
fn logged_in_cookie(state: &AppState, user_id: &str) -> String {
    let session = state.sessions.create_session(chrono::Utc::now()).unwrap();
    assert!(state.sessions.bind_user(&session.id, user_id).unwrap());
    format!("linkdex_session={}", session.id)
}

#[tokio::test]
async fn test_top_categories_orders_and_truncates() {
    let (state, _media) = test_state().await;

    for (i, name) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
        let category = category_mutations::create_category(&state.pool, name)
            .await
            .unwrap();
        // B and C tie on likes; insertion order must break the tie
        let likes = match *name {
            "B" | "C" => 50,
            _ => 10 - i as i64,
        };
        category_db::set_counters(&state.pool, &category.id, 0, likes)
            .await
            .unwrap();
    }

    let top = category_db::top_categories(&state.pool, 5).await.unwrap();
    assert_eq!(top.len(), 5);

    let names: Vec<&str> = top.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["B", "C", "A", "D", "E"]);
}

#[tokio::test]
async fn test_top_pages_orders_by_views() {
    let (state, _media) = test_state().await;

    let category = category_mutations::create_category(&state.pool, "Python")
        .await
        .unwrap();
    for (title, views) in [("low", 1), ("high", 9), ("mid", 5)] {
        let page = page_mutations::create_page(
            &state.pool,
            &category.id,
            title,
            "https://example.com/page",
        )
        .await
        .unwrap();
        page_db::set_views(&state.pool, &page.id, views).await.unwrap();
    }

    let top = page_db::top_pages(&state.pool, 5).await.unwrap();
    let titles: Vec<&str> = top.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["high", "mid", "low"]);
}

#[tokio::test]
async fn test_create_category_derives_slug() {
    let (state, _media) = test_state().await;

    let category = category_mutations::create_category(&state.pool, "Python Tools")
        .await
        .unwrap();
    assert_eq!(category.slug, "python-tools");
    assert_eq!(category.views, 0);
    assert_eq!(category.likes, 0);

    // Same name again is a user error, not a constraint violation
    let err = category_mutations::create_category(&state.pool, "Python Tools")
        .await
        .unwrap_err();
    assert!(err.is_invalid());
}

#[tokio::test]
async fn test_rename_recomputes_slug() {
    let (state, _media) = test_state().await;

    category_mutations::create_category(&state.pool, "Python Tools")
        .await
        .unwrap();
    let renamed = category_mutations::rename_category(&state.pool, "python-tools", "Rust Tools")
        .await
        .unwrap();

    assert_eq!(renamed.name, "Rust Tools");
    assert_eq!(renamed.slug, "rust-tools");

    assert!(
        category_db::fetch_category_by_slug(&state.pool, "python-tools")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_unknown_slug_is_not_an_error() {
    let (state, _media) = test_state().await;

    let category = category_db::fetch_category_by_slug(&state.pool, "nonexistent")
        .await
        .unwrap();
    assert!(category.is_none());

    let app: Router = build_router(state);
    let response = app.oneshot(get("/category/nonexistent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("The specified category does not exist."));
}

#[tokio::test]
async fn test_create_page_associates_category_and_zeroes_views() {
    let (state, _media) = test_state().await;

    let category = category_mutations::create_category(&state.pool, "Python")
        .await
        .unwrap();
    let page = page_mutations::create_page(
        &state.pool,
        &category.id,
        "Official Python Tutorial",
        "https://docs.python.org/3/tutorial/",
    )
    .await
    .unwrap();

    assert_eq!(page.category_id, category.id);
    assert_eq!(page.views, 0);

    let listed = page_db::pages_for_category(&state.pool, &category.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Official Python Tutorial");
}

#[tokio::test]
async fn test_page_with_bad_url_is_rejected() {
    let (state, _media) = test_state().await;

    let category = category_mutations::create_category(&state.pool, "Python")
        .await
        .unwrap();
    let err = page_mutations::create_page(&state.pool, &category.id, "Broken", "not a url")
        .await
        .unwrap_err();
    assert!(err.is_invalid());
}

#[tokio::test]
async fn test_unauthenticated_add_category_redirects_to_login() {
    let (state, _media) = test_state().await;
    let pool = state.pool.clone();
    let app = build_router(state);

    let response = app
        .oneshot(post_form("/category/add", "name=Sneaky"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );

    // No record was created
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_authenticated_add_category_creates_record() {
    let (state, _media) = test_state().await;

    let user = store::create_user(
        &state.pool,
        NewUser {
            username: "alice",
            password: "hunter2",
            website: None,
            picture: None,
        },
    )
    .await
    .unwrap();
    let cookie = logged_in_cookie(&state, &user.id);

    let pool = state.pool.clone();
    let app = build_router(state);

    let mut request = post_form("/category/add", "name=Python+Tools");
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let created = category_db::fetch_category_by_slug(&pool, "python-tools")
        .await
        .unwrap();
    assert!(created.is_some());
}

#[tokio::test]
async fn test_like_endpoint_increments_and_returns_count() {
    let (state, _media) = test_state().await;

    let user = store::create_user(
        &state.pool,
        NewUser {
            username: "bob",
            password: "secret",
            website: None,
            picture: None,
        },
    )
    .await
    .unwrap();
    category_mutations::create_category(&state.pool, "Python")
        .await
        .unwrap();
    let cookie = logged_in_cookie(&state, &user.id);

    let app = build_router(state);

    for expected in ["1", "2"] {
        let mut request = Request::builder()
            .method("POST")
            .uri("/category/python/like")
            .body(Body::empty())
            .unwrap();
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, expected);
    }
}

#[tokio::test]
async fn test_login_then_restricted_access() {
    let (state, _media) = test_state().await;

    store::create_user(
        &state.pool,
        NewUser {
            username: "carol",
            password: "correct-horse",
            website: Some("https://carol.example.com"),
            picture: None,
        },
    )
    .await
    .unwrap();

    let app = build_router(state);

    // Restricted is gated before login
    let response = app.clone().oneshot(get("/restricted")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Wrong password re-renders the form
    let response = app
        .clone()
        .oneshot(post_form("/login", "username=carol&password=wrong"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("invalid username or password"));

    // Correct login redirects home and hands out a session cookie
    let response = app
        .clone()
        .oneshot(post_form("/login", "username=carol&password=correct-horse"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let mut request = get("/restricted");
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("carol"));
}

#[tokio::test]
async fn test_index_reports_one_visit_per_day() {
    let (state, _media) = test_state().await;
    let app = build_router(state);

    // First request creates the session and counts the first visit
    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let body = body_string(response).await;
    assert!(body.contains("Visits: 1"));

    // A same-day repeat stays at 1 and sets no new cookie
    let mut request = get("/");
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_string(response).await.contains("Visits: 1"));
}

#[tokio::test]
async fn test_registration_persists_user_and_profile() {
    let (state, _media) = test_state().await;

    let user = store::create_user(
        &state.pool,
        NewUser {
            username: "dave",
            password: "pw",
            website: Some("https://dave.example.com/"),
            picture: Some("avatar.png".to_string()),
        },
    )
    .await
    .unwrap();

    let profile = store::fetch_profile(&state.pool, &user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.website.as_deref(), Some("https://dave.example.com"));
    assert_eq!(profile.picture.as_deref(), Some("avatar.png"));

    // Duplicate username is a user error
    let err = store::create_user(
        &state.pool,
        NewUser {
            username: "dave",
            password: "other",
            website: None,
            picture: None,
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_invalid());

    // Credentials verify, wrong ones do not
    assert!(
        store::verify_login(&state.pool, "dave", "pw")
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        store::verify_login(&state.pool, "dave", "nope")
            .await
            .unwrap()
            .is_none()
    );
}
