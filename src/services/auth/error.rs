//! Authentication failure taxonomy.
//!
//! Every variant ends up as the same `401 Unauthorized` for the client; the
//! variants only exist so logs can tell the cases apart.
use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("malformed authorization header")]
    MalformedToken,
    #[error("token could not be decoded: {0}")]
    UndecodableToken(String),
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired or not yet valid")]
    ExpiredToken,
    #[error("claim mismatch: {0}")]
    ClaimMismatch(String),
    #[error("no verification key matches the token")]
    UnknownKey,
    // Internal verification failure. Fails closed; only visible in logs.
    #[error("token verifier failure: {0}")]
    Verifier(String),
}

/// Client-visible reason code carried by every denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    MissingOrMalformedToken,
    InvalidToken,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingOrMalformedToken => "missing_or_malformed_token",
            Self::InvalidToken => "invalid_token",
        }
    }
}

impl AuthError {
    pub fn reason(&self) -> Reason {
        match self {
            Self::MissingToken | Self::MalformedToken => Reason::MissingOrMalformedToken,
            _ => Reason::InvalidToken,
        }
    }

    /// `WWW-Authenticate` challenge (RFC 6750 section 3).
    pub fn challenge(&self) -> &'static str {
        match self {
            Self::MissingToken => "Bearer",
            Self::MalformedToken => r#"Bearer error="invalid_request""#,
            _ => r#"Bearer error="invalid_token""#,
        }
    }

    /// Internal failures are logged louder than ordinary rejections.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Verifier(_))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Self::UndecodableToken(e.to_string()),
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => Self::ExpiredToken,
            ErrorKind::InvalidIssuer => Self::ClaimMismatch("iss".to_string()),
            ErrorKind::InvalidAudience => Self::ClaimMismatch("aud".to_string()),
            ErrorKind::InvalidSubject => Self::ClaimMismatch("sub".to_string()),
            ErrorKind::MissingRequiredClaim(claim) => Self::ClaimMismatch(claim.clone()),
            _ => Self::Verifier(e.to_string()),
        }
    }
}
