use sqlx::SqlitePool;

use super::db::{fetch_category_by_slug, name_or_slug_exists};
use super::models::CategoryRecord;
use crate::error::OpError;
use crate::validation::slug::{slugify, validate_slug};

const MAX_NAME_LEN: usize = 128;

/// Create a category. The slug is derived from the name, never supplied.
pub async fn create_category(pool: &SqlitePool, name: &str) -> Result<CategoryRecord, OpError> {
    let name = name.trim();
    let slug = checked_slug(name)?;

    if name_or_slug_exists(pool, name, &slug, None).await? {
        return Err(OpError::invalid("a category with this name already exists"));
    }

    let id = cuid2::create_id();
    sqlx::query("INSERT INTO categories (id, name, slug) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(&slug)
        .execute(pool)
        .await?;

    metrics::counter!("linkdex_categories_created_total").increment(1);

    Ok(CategoryRecord {
        id,
        name: name.to_string(),
        slug,
        views: 0,
        likes: 0,
    })
}

/// Rename a category. The slug is recomputed from the new name.
pub async fn rename_category(
    pool: &SqlitePool,
    slug: &str,
    new_name: &str,
) -> Result<CategoryRecord, OpError> {
    let Some(category) = fetch_category_by_slug(pool, slug).await? else {
        return Err(OpError::invalid("category not found"));
    };

    let new_name = new_name.trim();
    let new_slug = checked_slug(new_name)?;

    if name_or_slug_exists(pool, new_name, &new_slug, Some(&category.id)).await? {
        return Err(OpError::invalid("a category with this name already exists"));
    }

    sqlx::query("UPDATE categories SET name = ?, slug = ? WHERE id = ?")
        .bind(new_name)
        .bind(&new_slug)
        .bind(&category.id)
        .execute(pool)
        .await?;

    Ok(CategoryRecord {
        name: new_name.to_string(),
        slug: new_slug,
        ..category
    })
}

fn checked_slug(name: &str) -> Result<String, OpError> {
    if name.is_empty() {
        return Err(OpError::invalid("category name cannot be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(OpError::invalid(format!(
            "category name must be at most {MAX_NAME_LEN} characters"
        )));
    }

    let slug = slugify(name);
    validate_slug(&slug)
        .map_err(|_| OpError::invalid("category name must contain letters or digits"))?;

    Ok(slug)
}
