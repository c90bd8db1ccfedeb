//! `Authorization: Bearer <token>` extraction (RFC 6750 section 2.1).
use axum::http::{HeaderMap, header};

use super::error::AuthError;

/// Pull the bearer token out of the request headers.
///
/// - no `Authorization` header: `MissingToken`
/// - several headers, non-ASCII value, other scheme, empty or
///   non-`b64token` credentials: `MalformedToken`
pub fn extract(headers: &HeaderMap) -> Result<&str, AuthError> {
    let mut values = headers.get_all(header::AUTHORIZATION).iter();

    let value = values.next().ok_or(AuthError::MissingToken)?;
    if values.next().is_some() {
        return Err(AuthError::MalformedToken);
    }

    let value = value.to_str().map_err(|_| AuthError::MalformedToken)?;
    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::MalformedToken)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedToken);
    }

    let token = token.trim();
    if !is_b64token(token) {
        return Err(AuthError::MalformedToken);
    }

    Ok(token)
}

// b64token = 1*( ALPHA / DIGIT / "-" / "." / "_" / "~" / "+" / "/" ) *"="
fn is_b64token(token: &str) -> bool {
    let body = token.trim_end_matches('=');
    !body.is_empty()
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"-._~+/".contains(&b))
}
