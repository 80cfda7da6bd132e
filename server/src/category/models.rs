use serde::Serialize;

#[derive(Clone, Debug, sqlx::FromRow, Serialize)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub views: i64,
    pub likes: i64,
}
