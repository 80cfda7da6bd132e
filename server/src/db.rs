use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
pub use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

const DB_FILENAME: &str = "linkdex.db";

/// Initialize the linkdex database, running migrations as needed.
///
/// `data_dir` comes from the config file; `LINKDEX_DB_PATH` overrides it.
pub async fn init_pool(data_dir: &str) -> Result<(SqlitePool, PathBuf)> {
    let data_dir = std::env::var("LINKDEX_DB_PATH").unwrap_or_else(|_| data_dir.to_string());

    let data_dir_path = normalize_path(data_dir)?;
    std::fs::create_dir_all(&data_dir_path)
        .with_context(|| format!("failed to create DB path: {}", data_dir_path.display()))?;

    let db_path = data_dir_path.join(DB_FILENAME);
    let db_uri = format!("sqlite://{}", db_path.to_string_lossy());

    let connect_options = SqliteConnectOptions::from_str(&db_uri)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok((pool, data_dir_path))
}

pub fn normalize_path<P: Into<PathBuf>>(path: P) -> Result<PathBuf> {
    let path = path.into();
    if path.is_absolute() {
        return Ok(path);
    }

    let cwd = std::env::current_dir().context("failed to read current working directory")?;
    Ok(cwd.join(path))
}
