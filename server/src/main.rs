use std::sync::Arc;

use anyhow::{Context, Result};
use server::api::{AppState, server::run_api};
use server::auth::SessionManager;
use server::supervisor::Supervisor;
use server::{config, db};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = config::loader::load_with_discovery()?;
    config
        .validate()
        .map_err(|message| anyhow::anyhow!("invalid configuration: {message}"))?;

    let (pool, data_dir) = db::init_pool(&config.database.path).await?;
    tracing::info!("database ready at {}", data_dir.display());

    let media_dir = db::normalize_path(config.media.dir.clone())?;
    std::fs::create_dir_all(&media_dir)
        .with_context(|| format!("failed to create media directory: {}", media_dir.display()))?;

    let state = AppState {
        pool,
        sessions: Arc::new(SessionManager::new()),
        media_dir,
        cookie_name: config.session.cookie_name.clone(),
    };

    let mut supervisor = Supervisor::new();
    let bind = config.http.bind.clone();
    supervisor.spawn("api", move |shutdown| run_api(state, bind, shutdown));
    supervisor.run().await
}
