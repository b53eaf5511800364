//! Short code generation and custom alias validation.
//!
//! Codes are drawn from a case-insensitive 36-symbol alphabet (lowercase
//! letters + digits) so that `k3f9a` and `K3F9A` name the same link.
//! Collisions are expected and handled by the caller with bounded retries.

use crate::error::AppError;
use rand::Rng;
use serde_json::json;

/// Alphabet for generated codes. Case-insensitive by construction.
const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Codes that can never be allocated or claimed as custom aliases.
///
/// These collide with the service's own route segments and common
/// infrastructure paths.
pub const RESERVED_CODES: &[&str] = &[
    "admin", "api", "app", "auth", "docs", "health", "login", "logout", "shorten", "static",
    "stats", "status", "www",
];

/// Generates a random short code of the given length.
///
/// Uniformly distributed over the 36-symbol alphabet; `36^length` possible
/// codes. Pure generation: uniqueness against persisted codes and the
/// reserved set is the caller's responsibility.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();

    (0..length)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Returns true if the case-folded code is in the reserved set.
pub fn is_reserved(code: &str) -> bool {
    let folded = code.to_ascii_lowercase();
    RESERVED_CODES.contains(&folded.as_str())
}

/// Validates a user-provided custom alias and returns its case-folded form.
///
/// # Rules
///
/// - Length: 3-20 characters
/// - Allowed characters: letters, digits, hyphens (compared case-insensitively)
/// - Cannot start or end with a hyphen
/// - Cannot be a reserved code
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated, or
/// [`AppError::Conflict`] for reserved codes.
pub fn validate_custom_alias(alias: &str) -> Result<String, AppError> {
    if alias.len() < 3 || alias.len() > 20 {
        return Err(AppError::bad_request(
            "Custom alias must be 3-20 characters",
            json!({ "provided_length": alias.len() }),
        ));
    }

    let folded = alias.to_ascii_lowercase();

    if !folded
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(AppError::bad_request(
            "Custom alias can only contain letters, digits, and hyphens",
            json!({ "alias": alias }),
        ));
    }

    if folded.starts_with('-') || folded.ends_with('-') {
        return Err(AppError::bad_request(
            "Custom alias cannot start or end with a hyphen",
            json!({ "alias": alias }),
        ));
    }

    if RESERVED_CODES.contains(&folded.as_str()) {
        return Err(AppError::conflict(
            "This alias is a reserved word",
            json!({ "alias": alias }),
        ));
    }

    Ok(folded)
}
