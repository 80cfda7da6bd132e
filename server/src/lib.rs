//! Linkdex server library

pub mod api;
pub mod auth;
pub mod category;
pub mod config;
pub mod db;
pub mod error;
pub mod page;
pub mod supervisor;
pub mod validation;

pub mod test_helpers;
