use serde::Serialize;

#[derive(Clone, Debug, sqlx::FromRow, Serialize)]
pub struct PageRecord {
    pub id: String,
    pub category_id: String,
    pub title: String,
    pub url: String,
    pub views: i64,
}
