use super::models::PageRecord;
use sqlx::SqlitePool;

/// Pages ordered by views descending; ties keep insertion order.
pub async fn top_pages(pool: &SqlitePool, limit: i64) -> Result<Vec<PageRecord>, sqlx::Error> {
    sqlx::query_as::<_, PageRecord>(
        "SELECT id, category_id, title, url, views FROM pages \
         ORDER BY views DESC, rowid ASC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn pages_for_category(
    pool: &SqlitePool,
    category_id: &str,
) -> Result<Vec<PageRecord>, sqlx::Error> {
    sqlx::query_as::<_, PageRecord>(
        "SELECT id, category_id, title, url, views FROM pages \
         WHERE category_id = ? ORDER BY views DESC, rowid ASC",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await
}

/// Overwrite the view counter; used by the seeding CLI.
pub async fn set_views(pool: &SqlitePool, id: &str, views: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE pages SET views = ? WHERE id = ?")
        .bind(views)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
