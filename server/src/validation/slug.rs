//! Slug derivation and validation.
//!
//! A category's slug is a pure function of its display name: it is
//! recomputed on every save, including renames.

/// Derive a URL-safe slug from a display name.
///
/// Lowercases the name and collapses every run of non-alphanumeric
/// characters into a single hyphen. Returns an empty string when the
/// name contains nothing usable.
pub fn slugify(name: &str) -> String {
    let candidate = name.to_lowercase();

    let mut slug = String::new();
    let mut last_was_dash = false;

    for ch in candidate.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
            last_was_dash = false;
        } else if !last_was_dash && !slug.is_empty() {
            slug.push('-');
            last_was_dash = true;
        }
    }

    slug.trim_matches('-').to_string()
}

pub fn validate_slug(slug: &str) -> Result<(), String> {
    let is_valid = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if is_valid {
        Ok(())
    } else {
        Err("slug must be lowercase kebab-case".to_string())
    }
}
