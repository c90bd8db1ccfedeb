//! Request gate: classify -> (validate) -> allow / deny.
use std::sync::Arc;

use axum::http::{HeaderMap, Method, StatusCode};
use sha2::{Digest, Sha256};

use super::bearer;
use super::claims::Claims;
use super::error::{AuthError, Reason};
use super::rules::{Access, RouteRules};
use super::verifier::TokenVerifier;

/// Result of authenticating one request. Never stored.
#[derive(Debug)]
pub enum AuthResult {
    Authenticated(Claims),
    Rejected(AuthError),
}

#[derive(Debug)]
pub struct Denial {
    pub status: StatusCode,
    pub reason: Reason,
    pub error: AuthError,
}

impl From<AuthError> for Denial {
    fn from(error: AuthError) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            reason: error.reason(),
            error,
        }
    }
}

#[derive(Debug)]
pub enum Decision {
    // `None` for public routes, where no token is looked at.
    Allow(Option<Claims>),
    Deny(Denial),
}

/// Immutable after construction; share it behind an `Arc`.
#[derive(Clone)]
pub struct RequestGate {
    rules: RouteRules,
    verifier: Arc<dyn TokenVerifier>,
}

impl std::fmt::Debug for RequestGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGate")
            .field("rules", &self.rules.rules().len())
            .finish_non_exhaustive()
    }
}

impl RequestGate {
    pub fn new(rules: RouteRules, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { rules, verifier }
    }

    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }

    pub fn classify(&self, method: &Method, path: &str) -> Access {
        self.rules.classify(method, path)
    }

    /// Extract and verify the bearer token.
    pub async fn authenticate(&self, headers: &HeaderMap) -> AuthResult {
        let token = match bearer::extract(headers) {
            Ok(token) => token,
            Err(err) => return AuthResult::Rejected(err),
        };

        match self.verifier.verify(token).await {
            Ok(claims) => AuthResult::Authenticated(claims),
            Err(err) => {
                if err.is_internal() {
                    tracing::error!(error = %err, token = %fingerprint(token), "token verifier failure");
                } else {
                    tracing::debug!(error = %err, token = %fingerprint(token), "token rejected");
                }
                AuthResult::Rejected(err)
            }
        }
    }

    pub async fn decide(&self, method: &Method, path: &str, headers: &HeaderMap) -> Decision {
        if self.classify(method, path) == Access::Public {
            return Decision::Allow(None);
        }

        match self.authenticate(headers).await {
            AuthResult::Authenticated(claims) => Decision::Allow(Some(claims)),
            AuthResult::Rejected(err) => Decision::Deny(Denial::from(err)),
        }
    }
}

/// Short, non-reversible token id for log correlation.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest[..6].iter().map(|b| format!("{b:02x}")).collect()
}
