// The 20-feature lexical extractor.
//
// `FEATURE_NAMES` is the single source of truth for column order. The model
// is trained and queried positionally against it, and the CSV store writes
// its header from it — reordering this array silently breaks every stored
// model and dataset, so don't.
//
// extract() is total: it normalizes, parses, and counts, and anything it
// cannot compute stays at 0.0. It never returns an error and never panics.

use std::sync::OnceLock;

use regex_lite::Regex;

use super::url_parts;

/// Canonical feature order. Position is part of the model contract.
pub const FEATURE_NAMES: [&str; 20] = [
    "NumDots",
    "SubdomainLevel",
    "PathLevel",
    "UrlLength",
    "NumDash",
    "NumDashInHostname",
    "AtSymbol",
    "TildeSymbol",
    "NumUnderscore",
    "NumPercent",
    "NumQueryComponents",
    "NumAmpersand",
    "NumHash",
    "NumNumericChars",
    "NoHttps",
    "IpAddress",
    "HostnameLength",
    "PathLength",
    "QueryLength",
    "NumSensitiveWords",
];

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Words whose presence anywhere in the lowercased URL is a phishing signal.
/// Each contributes at most 1 to NumSensitiveWords.
const SENSITIVE_WORDS: [&str; 8] = [
    "secure", "login", "signin", "bank", "account", "update", "password", "verify",
];

/// Syntactic IPv4-literal check: four dot-separated 1–3 digit groups.
/// No octet-range validation — "999.999.999.999" matches. The training
/// distribution was built with this loose check, so it stays loose.
fn is_ip_literal(hostname: &str) -> bool {
    static IP_RE: OnceLock<Regex> = OnceLock::new();
    let re = IP_RE.get_or_init(|| {
        // The pattern is a literal; compilation cannot fail.
        Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").unwrap()
    });
    re.is_match(hostname)
}

/// Extract the canonical 20-feature vector from a raw URL string.
///
/// The URL is normalized (scheme defaulted to http://) before anything is
/// counted, so `extract("example.com")` and `extract("http://example.com")`
/// are identical by construction.
pub fn extract(url: &str) -> [f64; FEATURE_COUNT] {
    let url = url_parts::normalize(url);
    let parts = url_parts::parse(&url);
    let lowered = url.to_lowercase();

    let mut features = [0.0f64; FEATURE_COUNT];

    // NumDots
    features[0] = url.matches('.').count() as f64;
    // SubdomainLevel — label count minus 2; negative for bare hostnames is
    // accepted, not clamped.
    features[1] = parts.hostname.split('.').count() as f64 - 2.0;
    // PathLevel — "" splits into one empty segment, so a missing path is 0.
    features[2] = parts.path.split('/').count() as f64 - 1.0;
    // UrlLength (code points, not bytes)
    features[3] = url.chars().count() as f64;
    // NumDash
    features[4] = url.matches('-').count() as f64;
    // NumDashInHostname
    features[5] = parts.hostname.matches('-').count() as f64;
    // AtSymbol
    features[6] = if url.contains('@') { 1.0 } else { 0.0 };
    // TildeSymbol
    features[7] = if url.contains('~') { 1.0 } else { 0.0 };
    // NumUnderscore
    features[8] = url.matches('_').count() as f64;
    // NumPercent
    features[9] = url.matches('%').count() as f64;
    // NumQueryComponents — 0 when there is no query at all.
    features[10] = if parts.query.is_empty() {
        0.0
    } else {
        parts.query.split('&').count() as f64
    };
    // NumAmpersand
    features[11] = url.matches('&').count() as f64;
    // NumHash
    features[12] = url.matches('#').count() as f64;
    // NumNumericChars
    features[13] = url.chars().filter(|c| c.is_ascii_digit()).count() as f64;
    // NoHttps — case-sensitive prefix check on the normalized URL.
    features[14] = if url.starts_with("https") { 0.0 } else { 1.0 };
    // IpAddress
    features[15] = if is_ip_literal(&parts.hostname) { 1.0 } else { 0.0 };
    // HostnameLength
    features[16] = parts.hostname.chars().count() as f64;
    // PathLength
    features[17] = parts.path.chars().count() as f64;
    // QueryLength
    features[18] = parts.query.chars().count() as f64;
    // NumSensitiveWords — substring presence, each word at most once.
    features[19] = SENSITIVE_WORDS
        .iter()
        .filter(|w| lowered.contains(**w))
        .count() as f64;

    features
}
