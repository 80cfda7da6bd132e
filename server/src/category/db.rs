use super::models::CategoryRecord;
use sqlx::SqlitePool;

/// Categories ordered by likes descending; ties keep insertion order.
pub async fn top_categories(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<CategoryRecord>, sqlx::Error> {
    sqlx::query_as::<_, CategoryRecord>(
        "SELECT id, name, slug, views, likes FROM categories \
         ORDER BY likes DESC, rowid ASC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn fetch_category_by_slug(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<CategoryRecord>, sqlx::Error> {
    sqlx::query_as::<_, CategoryRecord>(
        "SELECT id, name, slug, views, likes FROM categories WHERE slug = ?",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_category_by_id(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<CategoryRecord>, sqlx::Error> {
    sqlx::query_as::<_, CategoryRecord>(
        "SELECT id, name, slug, views, likes FROM categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// True when another category already holds this name or slug.
/// `exclude_id` skips the category itself during renames.
pub async fn name_or_slug_exists(
    pool: &SqlitePool,
    name: &str,
    slug: &str,
    exclude_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let exists: Option<i64> = if let Some(exclude_id) = exclude_id {
        sqlx::query_scalar(
            "SELECT 1 FROM categories WHERE (name = ? OR slug = ?) AND id != ? LIMIT 1",
        )
        .bind(name)
        .bind(slug)
        .bind(exclude_id)
        .fetch_optional(pool)
        .await?
    } else {
        sqlx::query_scalar("SELECT 1 FROM categories WHERE name = ? OR slug = ? LIMIT 1")
            .bind(name)
            .bind(slug)
            .fetch_optional(pool)
            .await?
    };

    Ok(exists.is_some())
}

pub async fn bump_views(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE categories SET views = views + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Increment the like counter and return the new value.
pub async fn add_like(pool: &SqlitePool, id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("UPDATE categories SET likes = likes + 1 WHERE id = ? RETURNING likes")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Overwrite both counters; used by the seeding CLI.
pub async fn set_counters(
    pool: &SqlitePool,
    id: &str,
    views: i64,
    likes: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE categories SET views = ?, likes = ? WHERE id = ?")
        .bind(views)
        .bind(likes)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
