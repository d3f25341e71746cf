// URL normalization and decomposition.
//
// This is a deliberate RFC 3986 subset: split on "://", the authority runs
// to the first '/' or '?', and the query starts at the first '?'. Fragments
// are not separated — '#' only shows up as a counted character downstream.
// The classifier was trained against vectors produced by these exact rules,
// so tightening the parser would shift the feature distribution.

/// Decomposed URL. All fields are empty strings when absent, never None —
/// downstream feature math treats "missing" and "empty" identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// Authority component as written, port and userinfo included.
    pub hostname: String,
    /// Path including its leading '/', or "" when the URL has none.
    pub path: String,
    /// Query string without the '?', or "" when absent.
    pub query: String,
}

/// Prepend "http://" when the URL carries no scheme.
///
/// "Has a scheme" means the string contains "://" — the same test every call
/// path uses, so training-data ingestion, live prediction, and feedback
/// logging all see the same normalized form.
pub fn normalize(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}

/// Split a (normalized) URL into hostname, path, and query.
pub fn parse(url: &str) -> UrlParts {
    let after_scheme = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url,
    };

    // The authority ends at the first '/' or '?', whichever comes first.
    let host_end = after_scheme
        .find(['/', '?'])
        .unwrap_or(after_scheme.len());
    let hostname = &after_scheme[..host_end];
    let rest = &after_scheme[host_end..];

    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, query),
        None => (rest, ""),
    };

    UrlParts {
        hostname: hostname.to_string(),
        path: path.to_string(),
        query: query.to_string(),
    }
}
