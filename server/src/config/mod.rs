//! Configuration management for Linkdex
//!
//! This module handles loading and parsing of configuration files.
//! Configuration is stored in RON format for better Rust type
//! expressiveness.

pub mod loader;

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Top-level configuration for Linkdex
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub http: Http,

    #[serde(default)]
    pub database: Database,

    #[serde(default)]
    pub media: Media,

    #[serde(default)]
    pub session: SessionSettings,
}

impl Config {
    /// Validate the assembled configuration before the server starts.
    pub fn validate(&self) -> Result<(), String> {
        self.http
            .bind
            .parse::<SocketAddr>()
            .map_err(|_| format!("http.bind '{}' is not a valid socket address", self.http.bind))?;

        validate_cookie_name(&self.session.cookie_name)?;

        if self.database.path.is_empty() {
            return Err("database.path cannot be empty".to_string());
        }
        if self.media.dir.is_empty() {
            return Err("media.dir cannot be empty".to_string());
        }

        Ok(())
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Http {
    /// Socket address to bind, e.g. "0.0.0.0:8000"
    pub bind: String,
}

impl Default for Http {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Database {
    /// Directory holding the SQLite database file
    pub path: String,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            path: "./data".to_string(),
        }
    }
}

/// Uploaded media settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Media {
    /// Directory where profile pictures are stored and served from
    pub dir: String,
}

impl Default for Media {
    fn default() -> Self {
        Self {
            dir: "./media".to_string(),
        }
    }
}

/// Session cookie settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SessionSettings {
    /// Name of the cookie carrying the opaque session id
    pub cookie_name: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "linkdex_session".to_string(),
        }
    }
}

/// Cookie names must be valid HTTP tokens.
fn validate_cookie_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("session.cookie_name cannot be empty".to_string());
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!(
            "session.cookie_name '{}' must contain only letters, numbers, hyphens, and underscores",
            name
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.http.bind, "0.0.0.0:8000");
        assert_eq!(config.database.path, "./data");
        assert_eq!(config.media.dir, "./media");
        assert_eq!(config.session.cookie_name, "linkdex_session");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_bind() {
        let mut config = Config::default();
        config.http.bind = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_cookie_name_valid() {
        assert!(validate_cookie_name("linkdex_session").is_ok());
        assert!(validate_cookie_name("sid").is_ok());
        assert!(validate_cookie_name("my-cookie-2").is_ok());
    }

    #[test]
    fn test_validate_cookie_name_invalid() {
        assert!(validate_cookie_name("").is_err());
        assert!(validate_cookie_name("has space").is_err());
        assert!(validate_cookie_name("semi;colon").is_err());
        assert!(validate_cookie_name("eq=uals").is_err());
    }

    #[test]
    fn test_validate_rejects_empty_paths() {
        let mut config = Config::default();
        config.database.path = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.media.dir = String::new();
        assert!(config.validate().is_err());
    }
}
