//! Configuration file loading and parsing
//!
//! This module handles loading Linkdex configuration from RON files with
//! fallback strategies for finding config files in standard locations.

use super::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Standard config file names to search for
const CONFIG_FILENAMES: &[&str] = &["linkdex.ron", ".linkdex/config.ron"];

/// Load configuration from a specific file path
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_ron(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration with automatic file discovery
///
/// Searches for config files in the following locations (in order):
/// 1. Path specified in LINKDEX_CONFIG_PATH environment variable
/// 2. linkdex.ron in current directory
/// 3. .linkdex/config.ron relative to current directory
///
/// If no config file is found, returns a default configuration.
pub fn load_with_discovery() -> Result<Config> {
    // Check environment variable first
    if let Ok(env_path) = std::env::var("LINKDEX_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            tracing::info!("Loading config from LINKDEX_CONFIG_PATH: {}", path.display());
            return load_from_file(&path);
        } else {
            tracing::warn!(
                "LINKDEX_CONFIG_PATH specified but file not found: {}",
                path.display()
            );
        }
    }

    // Search standard locations
    for filename in CONFIG_FILENAMES {
        let path = PathBuf::from(filename);
        if path.exists() {
            tracing::info!("Loading config from: {}", path.display());
            return load_from_file(&path);
        }
    }

    // No config file found, use defaults
    tracing::info!("No config file found, using defaults");
    Ok(Config::default())
}

/// Parse RON configuration string
fn parse_ron(content: &str) -> Result<Config> {
    ron::from_str(content).context("Failed to parse RON configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_config() {
        let ron = r#"
Config(
    http: Http(
        bind: "127.0.0.1:9000",
    ),
)
        "#;

        let config = parse_ron(ron).unwrap();
        assert_eq!(config.http.bind, "127.0.0.1:9000");
        // Untouched sections keep their defaults
        assert_eq!(config.database.path, "./data");
        assert_eq!(config.session.cookie_name, "linkdex_session");
    }

    #[test]
    fn test_parse_full_config() {
        let ron = r#"
Config(
    http: Http(
        bind: "0.0.0.0:8080",
    ),
    database: Database(
        path: "/var/lib/linkdex",
    ),
    media: Media(
        dir: "/var/lib/linkdex/media",
    ),
    session: SessionSettings(
        cookie_name: "sid",
    ),
)
        "#;

        let config = parse_ron(ron).unwrap();
        assert_eq!(config.http.bind, "0.0.0.0:8080");
        assert_eq!(config.database.path, "/var/lib/linkdex");
        assert_eq!(config.media.dir, "/var/lib/linkdex/media");
        assert_eq!(config.session.cookie_name, "sid");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.ron");

        let ron_content = r#"
Config(
    http: Http(
        bind: "127.0.0.1:8001",
    ),
)
        "#;

        std::fs::write(&config_path, ron_content).unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.http.bind, "127.0.0.1:8001");
    }

    #[test]
    fn test_load_from_nonexistent_file() {
        let result = load_from_file("/nonexistent/path/config.ron");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_invalid_ron() {
        let invalid_ron = "This is not valid RON";
        let result = parse_ron(invalid_ron);
        assert!(result.is_err());
    }
}
