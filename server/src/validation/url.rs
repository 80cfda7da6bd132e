//! URL validation for page links and profile websites.

use url::Url;

/// Parse and normalize an absolute http(s) URL submitted through a form.
///
/// Fragments are stripped; query strings are kept since external links
/// may depend on them. Returns a user-presentable message on rejection.
pub fn normalize_link_url(raw: &str) -> Result<String, String> {
    let mut url = Url::parse(raw.trim()).map_err(|_| "not a valid absolute URL".to_string())?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err("only http(s) URLs are supported".to_string()),
    }

    url.set_fragment(None);

    let mut normalized: String = url.into();
    while normalized.ends_with('/') {
        normalized.pop();
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert_eq!(
            normalize_link_url("https://docs.python.org/3/tutorial/").unwrap(),
            "https://docs.python.org/3/tutorial"
        );
        assert_eq!(
            normalize_link_url("http://bottlepy.org/docs/dev/").unwrap(),
            "http://bottlepy.org/docs/dev"
        );
    }

    #[test]
    fn test_strips_fragment_keeps_query() {
        assert_eq!(
            normalize_link_url("https://example.com/page?q=rust#section").unwrap(),
            "https://example.com/page?q=rust"
        );
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(
            normalize_link_url("  https://example.com  ").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_rejects_relative_and_other_schemes() {
        assert!(normalize_link_url("not a url").is_err());
        assert!(normalize_link_url("/relative/path").is_err());
        assert!(normalize_link_url("ftp://example.com/file").is_err());
        assert!(normalize_link_url("javascript:alert(1)").is_err());
    }
}
