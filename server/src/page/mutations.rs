use sqlx::SqlitePool;

use super::models::PageRecord;
use crate::error::OpError;
use crate::validation::url::normalize_link_url;

const MAX_TITLE_LEN: usize = 128;

/// Create a page under an existing category. Views start at zero.
pub async fn create_page(
    pool: &SqlitePool,
    category_id: &str,
    title: &str,
    url: &str,
) -> Result<PageRecord, OpError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(OpError::invalid("page title cannot be empty"));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(OpError::invalid(format!(
            "page title must be at most {MAX_TITLE_LEN} characters"
        )));
    }

    let url = normalize_link_url(url).map_err(OpError::invalid)?;

    let id = cuid2::create_id();
    sqlx::query("INSERT INTO pages (id, category_id, title, url) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(category_id)
        .bind(title)
        .bind(&url)
        .execute(pool)
        .await?;

    metrics::counter!("linkdex_pages_created_total").increment(1);

    Ok(PageRecord {
        id,
        category_id: category_id.to_string(),
        title: title.to_string(),
        url,
        views: 0,
    })
}
