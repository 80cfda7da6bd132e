use anyhow::Result;
use axum::Router;
use axum::routing::{get, post};
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::{AppState, auth_handlers, handlers};

pub fn build_router(state: AppState) -> Router {
    let media_service = ServeDir::new(&state.media_dir);

    Router::new()
        .route("/", get(handlers::index))
        .route("/about", get(handlers::about))
        .route(
            "/category/add",
            get(handlers::add_category_form).post(handlers::add_category_submit),
        )
        .route("/category/{slug}", get(handlers::show_category))
        .route("/category/{slug}/like", post(handlers::like_category))
        .route(
            "/category/{slug}/page/add",
            get(handlers::add_page_form).post(handlers::add_page_submit),
        )
        .route(
            "/register",
            get(auth_handlers::register_form).post(auth_handlers::register_submit),
        )
        .route(
            "/login",
            get(auth_handlers::login_form).post(auth_handlers::login_submit),
        )
        .route("/logout", get(auth_handlers::logout))
        .route("/restricted", get(handlers::restricted))
        .nest_service("/media", media_service)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api(state: AppState, bind: String, shutdown: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("listening on {}", bind);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}
