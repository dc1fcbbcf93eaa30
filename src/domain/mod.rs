//! Domain name validation and normalization

use once_cell::sync::Lazy;
use regex::Regex;

static DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}$").unwrap()
});

const SCHEME_SEPARATOR: &str = "://";
const WWW_PREFIX: &str = "www.";

/// Text after the first scheme separator, up to a second one if present
fn strip_scheme(input: &str) -> &str {
    match input.split(SCHEME_SEPARATOR).nth(1) {
        Some(rest) => rest,
        None => input,
    }
}

/// Check that the input is a well-formed domain name or URL
pub fn is_valid_domain(input: &str) -> bool {
    let host = strip_scheme(input.trim());
    let host = host.split('/').next().unwrap_or(host);
    DOMAIN_PATTERN.is_match(host)
}

/// Normalize a domain for storage
///
/// Lowercases and removes the scheme, trailing slashes and any leading
/// `www.` prefixes. Applying it to its own output changes nothing.
pub fn format_domain(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let next = format_step(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn format_step(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let mut domain = strip_scheme(&lowered).trim_end_matches('/');

    while let Some(rest) = domain.strip_prefix(WWW_PREFIX) {
        domain = rest;
    }

    domain.to_string()
}

/// Favicon URL for a domain
pub fn favicon_url(domain: &str) -> String {
    format!(
        "https://www.google.com/s2/favicons?domain={}&sz=64",
        urlencoding::encode(&format_domain(domain))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_domains() {
        assert!(is_valid_domain("example.com"));
        assert!(is_valid_domain("sub.example.co.uk"));
        assert!(is_valid_domain("https://example.com/path?q=1"));
        assert!(is_valid_domain("my-site.io"));
    }

    #[test]
    fn test_invalid_domains() {
        assert!(!is_valid_domain(""));
        assert!(!is_valid_domain("localhost"));
        assert!(!is_valid_domain("-bad.com"));
        assert!(!is_valid_domain("example.c"));
        assert!(!is_valid_domain("exa mple.com"));
    }

    #[test]
    fn test_format_domain() {
        assert_eq!(format_domain("https://www.Example.com/"), "example.com");
        assert_eq!(format_domain("http://example.com///"), "example.com");
        assert_eq!(format_domain("www.example.com"), "example.com");
        assert_eq!(format_domain("example.com/docs/"), "example.com/docs");
    }

    #[test]
    fn test_format_domain_is_idempotent() {
        let inputs = [
            "https://www.Example.com/",
            "www.www.example.com",
            "a://b://c.com",
            "  HTTPS://Photo-Edit.AI// ",
            "example.com/docs/",
            "www./",
        ];
        for input in inputs {
            let once = format_domain(input);
            assert_eq!(format_domain(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_favicon_url() {
        assert_eq!(
            favicon_url("https://www.example.com/"),
            "https://www.google.com/s2/favicons?domain=example.com&sz=64"
        );
    }
}
