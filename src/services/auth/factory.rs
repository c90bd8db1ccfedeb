//! Factory: build the `RequestGate` from application `Config`.
//!
//! Keys are loaded here, once, at startup.
use std::sync::Arc;

use thiserror::Error;

use crate::config::{Config, KeySource};
use crate::services::auth::{
    gate::RequestGate,
    keys::{KeyError, KeySet},
    rules::{PatternError, RouteRules},
    verifier::{JwtVerifier, ValidationPolicy},
};

#[derive(Debug, Error)]
pub enum GateBuildError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Key(#[from] KeyError),
}

pub fn build_key_set(source: &KeySource) -> Result<KeySet, KeyError> {
    match source {
        KeySource::PublicKeyPem { pem, algorithm } => KeySet::from_public_pem(pem, *algorithm),
        KeySource::HmacSecret {
            secret_base64,
            algorithm,
        } => KeySet::from_hmac_secret_base64(secret_base64, *algorithm),
        KeySource::JwksFile { path } => KeySet::from_jwks_file(path),
    }
}

pub fn build_request_gate(config: &Config) -> Result<Arc<RequestGate>, GateBuildError> {
    let rules = RouteRules::from_patterns(
        &config.protected_path_patterns,
        &config.public_path_patterns,
    )?;

    let keys = build_key_set(&config.jwt.key_source)?;
    tracing::info!(
        keys = keys.len(),
        source = ?config.jwt.key_source,
        rules = rules.rules().len(),
        "token verification keys loaded"
    );

    let verifier = JwtVerifier::new(
        keys,
        ValidationPolicy {
            issuer: config.jwt.issuer.clone(),
            audiences: config.jwt.audiences.clone(),
            leeway_seconds: config.jwt.leeway_seconds,
        },
    );

    Ok(Arc::new(RequestGate::new(rules, Arc::new(verifier))))
}
