//! Addressing-mode resolution for user requests.
//!
//! A request names its user through the `{user_id}` path segment or the
//! `username` query parameter, never both. Empty values count as absent.

use thiserror::Error;

/// Which user(s) a request addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserTarget {
    Collection,
    ById(i64),
    ByUsername(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("user id is not a non-negative integer")]
    InvalidIdentifier,

    #[error("exactly one of user id or username must be given")]
    AmbiguousOrMissingTarget,
}

/// Resolve the addressing mode, allowing the whole collection.
pub fn resolve(path_id: Option<&str>, username: Option<&str>) -> Result<UserTarget, TargetError> {
    let path_id = path_id.filter(|value| !value.is_empty());
    let username = username.filter(|value| !value.is_empty());

    match (path_id, username) {
        (None, None) => Ok(UserTarget::Collection),
        (Some(_), Some(_)) => Err(TargetError::AmbiguousOrMissingTarget),
        (None, Some(username)) => Ok(UserTarget::ByUsername(username.to_string())),
        (Some(raw), None) => parse_user_id(raw).map(UserTarget::ById),
    }
}

/// Resolve a single user; the collection is not a valid target here.
pub fn resolve_single(
    path_id: Option<&str>,
    username: Option<&str>,
) -> Result<UserTarget, TargetError> {
    match resolve(path_id, username)? {
        UserTarget::Collection => Err(TargetError::AmbiguousOrMissingTarget),
        target => Ok(target),
    }
}

/// Digits only, within `i64` range.
pub fn parse_user_id(raw: &str) -> Result<i64, TargetError> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(TargetError::InvalidIdentifier);
    }

    raw.parse::<i64>()
        .map_err(|_| TargetError::InvalidIdentifier)
}
