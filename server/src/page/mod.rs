pub mod db;
pub mod models;
pub mod mutations;

pub use models::PageRecord;
