use url::Url;

/// Link emitted for an item whose `href` cannot be resolved.
///
/// Not a valid URL. Kept byte-for-byte because existing subscribers may
/// already have items carrying it.
pub const UNRESOLVED_LINK: &str = "failed to parse link: err";

/// Resolves `candidate` (usually an `href` value) against the page URL.
///
/// Standard relative-reference resolution: an empty candidate yields `base`
/// itself, an absolute candidate replaces it. A candidate the URL parser
/// rejects yields [`UNRESOLVED_LINK`] rather than failing the item.
pub fn resolve(base: &Url, candidate: &str) -> String {
    match base.join(candidate) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!(
                base = %base,
                href = %candidate,
                error = %e,
                "Failed to resolve item link"
            );
            UNRESOLVED_LINK.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_resolve_relative_path() {
        assert_eq!(
            resolve(&base("https://example.com/blog/"), "post/1"),
            "https://example.com/blog/post/1"
        );
    }

    #[test]
    fn test_resolve_empty_is_base() {
        assert_eq!(
            resolve(&base("https://example.com/blog/"), ""),
            "https://example.com/blog/"
        );
    }

    #[test]
    fn test_resolve_root_relative() {
        assert_eq!(
            resolve(&base("https://example.com/blog/index.html"), "/about"),
            "https://example.com/about"
        );
    }

    #[test]
    fn test_resolve_sibling_of_file() {
        assert_eq!(
            resolve(&base("https://example.com/blog/index.html"), "post.html"),
            "https://example.com/blog/post.html"
        );
    }

    #[test]
    fn test_resolve_absolute_candidate() {
        assert_eq!(
            resolve(&base("https://example.com/"), "http://other.org/x?y=1"),
            "http://other.org/x?y=1"
        );
    }

    #[test]
    fn test_resolve_protocol_relative() {
        assert_eq!(
            resolve(&base("https://example.com/"), "//cdn.example.net/a"),
            "https://cdn.example.net/a"
        );
    }

    #[test]
    fn test_resolve_fragment_and_query() {
        assert_eq!(
            resolve(&base("https://example.com/list?page=2"), "#top"),
            "https://example.com/list?page=2#top"
        );
        assert_eq!(
            resolve(&base("https://example.com/list?page=2"), "?page=3"),
            "https://example.com/list?page=3"
        );
    }

    #[test]
    fn test_resolve_dot_segments() {
        assert_eq!(
            resolve(&base("https://example.com/a/b/c"), "../d"),
            "https://example.com/a/d"
        );
    }

    #[test]
    fn test_unparseable_candidate_yields_placeholder() {
        assert_eq!(
            resolve(&base("https://example.com/"), "http://[broken"),
            UNRESOLVED_LINK
        );
    }

    #[test]
    fn test_relative_against_cannot_be_base_yields_placeholder() {
        assert_eq!(
            resolve(&base("mailto:someone@example.com"), "post/1"),
            UNRESOLVED_LINK
        );
    }
}
