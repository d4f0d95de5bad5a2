//! Storage-key derivation for multi-tenant isolation.
//!
//! Every account gets a stable key derived from its identifier; every data
//! user (household member) gets a sub-key under it. Derivation is pure,
//! with no registry lookup and no salt, so the same identifier always lands
//! on the same partition across restarts.

use sha2::{Digest, Sha256};

/// Hex length of an account key. 64 bits keeps keys short enough to audit in
/// file names while making accidental collisions negligible.
const ACCOUNT_KEY_LEN: usize = 16;

/// Derive the opaque storage key for an account identifier (e.g. an email).
/// Case and surrounding whitespace are ignored so login-form variations of
/// the same address map to the same partition.
pub fn account_key(identifier: &str) -> String {
    let canonical = identifier.trim().to_lowercase();
    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(digest)[..ACCOUNT_KEY_LEN].to_string()
}

/// Storage-safe slug for a data-user name: lowercased, whitespace runs
/// become `_`, everything outside `[a-z0-9_]` is dropped. Distinct names
/// slugging to the same value within one account is a conflict the account
/// registry must surface, not merge.
pub fn data_user_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for c in name.trim().to_lowercase().chars() {
        if c.is_whitespace() {
            if !last_was_sep {
                slug.push('_');
                last_was_sep = true;
            }
        } else if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
            last_was_sep = false;
        }
    }
    slug.trim_matches('_').to_string()
}

/// Storage key for one data user's transaction history.
pub fn data_key(account_key: &str, data_user_name: &str) -> String {
    format!("{}_{}", account_key, data_user_slug(data_user_name))
}

/// Storage key for an account's config table (learned mappings live there).
pub fn config_key(account_key: &str) -> String {
    format!("{account_key}_config")
}
