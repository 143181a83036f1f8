//! Forwarded query construction.
//!
//! The proxy consumes a few reserved query keys itself; every other
//! parameter is passed to the upstream unchanged, preserving order and
//! duplicates.

/// Selects the upstream endpoint path on the credentialed branch.
pub const PATH_KEY: &str = "path";
/// Selects the upstream source.
pub const SOURCE_KEY: &str = "source";
/// Carries the ticker in the short request shape (`?source=stooq&code=...`).
pub const CODE_KEY: &str = "code";
/// A client-supplied credential. Never forwarded: the real credential
/// travels in a header only, and a client must not be able to override it.
pub const TOKEN_KEY: &str = "token";

const RESERVED_KEYS: [&str; 4] = [PATH_KEY, SOURCE_KEY, CODE_KEY, TOKEN_KEY];

/// First value for `key`, treating an empty value as absent so `path=` and
/// `source=` fall back to their defaults like a missing parameter would.
pub fn first_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

/// True if any pair in `params` uses `key` (exact match).
pub fn has_key(params: &[(String, String)], key: &str) -> bool {
    params.iter().any(|(k, _)| k == key)
}

/// The parameters to forward upstream: everything except the reserved keys,
/// in their original order, duplicates included.
pub fn forwarded_params(params: &[(String, String)]) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
        .cloned()
        .collect()
}
