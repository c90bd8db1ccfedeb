//! Verification key material, loaded once at startup and read-only afterwards.
use base64::{Engine, engine::general_purpose::STANDARD};
use jsonwebtoken::{
    Algorithm, DecodingKey,
    jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm, PublicKeyUse},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid public key pem: {0}")]
    InvalidPem(jsonwebtoken::errors::Error),
    #[error("algorithm {0:?} cannot be used with this key source")]
    UnsupportedAlgorithm(Algorithm),
    #[error("invalid base64 hmac secret")]
    InvalidSecret,
    #[error("hmac secret must be at least 32 bytes")]
    WeakSecret,
    #[error("failed to read jwks file {path}: {source}")]
    ReadJwks {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid jwks document: {0}")]
    InvalidJwks(serde_json::Error),
    #[error("jwks contains no usable key")]
    EmptyJwks,
}

/// One verification key and the single algorithm it accepts.
#[derive(Clone)]
pub struct VerificationKey {
    pub kid: Option<String>,
    pub algorithm: Algorithm,
    pub key: DecodingKey,
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("VerificationKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct KeySet {
    keys: Vec<VerificationKey>,
}

impl KeySet {
    fn new(keys: Vec<VerificationKey>) -> Self {
        Self { keys }
    }

    /// PEM encoded public key (RSA, EC or Ed25519) for one asymmetric algorithm.
    pub fn from_public_pem(pem: &str, algorithm: Algorithm) -> Result<Self, KeyError> {
        let bytes = pem.as_bytes();
        let key = match algorithm {
            Algorithm::EdDSA => DecodingKey::from_ed_pem(bytes),
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(bytes),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(bytes),
            other => return Err(KeyError::UnsupportedAlgorithm(other)),
        }
        .map_err(KeyError::InvalidPem)?;

        Ok(Self::new(vec![VerificationKey {
            kid: None,
            algorithm,
            key,
        }]))
    }

    /// Base64 (standard alphabet) HMAC secret.
    pub fn from_hmac_secret_base64(secret: &str, algorithm: Algorithm) -> Result<Self, KeyError> {
        let secret = STANDARD
            .decode(secret.trim())
            .map_err(|_| KeyError::InvalidSecret)?;
        Self::from_hmac_secret(&secret, algorithm)
    }

    pub fn from_hmac_secret(secret: &[u8], algorithm: Algorithm) -> Result<Self, KeyError> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(KeyError::UnsupportedAlgorithm(algorithm));
        }
        if secret.len() < 32 {
            return Err(KeyError::WeakSecret);
        }

        Ok(Self::new(vec![VerificationKey {
            kid: None,
            algorithm,
            key: DecodingKey::from_secret(secret),
        }]))
    }

    pub fn from_jwks_file(path: &str) -> Result<Self, KeyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| KeyError::ReadJwks {
            path: path.to_string(),
            source,
        })?;
        Self::from_jwks_json(&raw)
    }

    /// Encryption keys (`"use": "enc"`) are ignored. Keys that cannot be
    /// decoded or whose algorithm is unknown are skipped with a warning; an
    /// empty result is an error.
    pub fn from_jwks_json(raw: &str) -> Result<Self, KeyError> {
        let set: JwkSet = serde_json::from_str(raw).map_err(KeyError::InvalidJwks)?;

        let mut keys = Vec::with_capacity(set.keys.len());
        for jwk in &set.keys {
            let kid = jwk.common.key_id.clone();
            if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
                tracing::debug!(kid = ?kid, "skipping encryption jwk");
                continue;
            }
            let Some(algorithm) = jwk_algorithm(jwk) else {
                tracing::warn!(kid = ?kid, "skipping jwk with unsupported algorithm");
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => keys.push(VerificationKey {
                    kid,
                    algorithm,
                    key,
                }),
                Err(err) => tracing::warn!(kid = ?kid, error = %err, "skipping unusable jwk"),
            }
        }

        if keys.is_empty() {
            return Err(KeyError::EmptyJwks);
        }
        Ok(Self::new(keys))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Candidate keys for a token header, all registered for `alg`.
    ///
    /// - Without a `kid`: every such key.
    /// - With a `kid`: the keys carrying it. Only when none does, the keys
    ///   that were registered without an id (a single PEM or HMAC key).
    ///   A kid never selects a key registered under another id.
    pub fn candidates(&self, kid: Option<&str>, alg: Algorithm) -> Vec<&VerificationKey> {
        let for_alg = self.keys.iter().filter(|k| k.algorithm == alg);
        let Some(kid) = kid else {
            return for_alg.collect();
        };

        let named: Vec<_> = for_alg
            .clone()
            .filter(|k| k.kid.as_deref() == Some(kid))
            .collect();
        if !named.is_empty() {
            return named;
        }
        for_alg.filter(|k| k.kid.is_none()).collect()
    }
}

// Explicit `alg` wins; otherwise infer from the key type.
fn jwk_algorithm(jwk: &Jwk) -> Option<Algorithm> {
    if let Some(alg) = &jwk.common.key_algorithm {
        return signing_algorithm(alg);
    }

    match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => Some(Algorithm::RS256),
        AlgorithmParameters::EllipticCurve(ec) => match ec.curve {
            EllipticCurve::P256 => Some(Algorithm::ES256),
            EllipticCurve::P384 => Some(Algorithm::ES384),
            _ => None,
        },
        AlgorithmParameters::OctetKeyPair(_) => Some(Algorithm::EdDSA),
        AlgorithmParameters::OctetKey(_) => Some(Algorithm::HS256),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

// Key-management algorithms (RSA1_5, RSA-OAEP, ...) cannot verify a JWS.
fn signing_algorithm(alg: &KeyAlgorithm) -> Option<Algorithm> {
    match alg {
        KeyAlgorithm::HS256 => Some(Algorithm::HS256),
        KeyAlgorithm::HS384 => Some(Algorithm::HS384),
        KeyAlgorithm::HS512 => Some(Algorithm::HS512),
        KeyAlgorithm::RS256 => Some(Algorithm::RS256),
        KeyAlgorithm::RS384 => Some(Algorithm::RS384),
        KeyAlgorithm::RS512 => Some(Algorithm::RS512),
        KeyAlgorithm::PS256 => Some(Algorithm::PS256),
        KeyAlgorithm::PS384 => Some(Algorithm::PS384),
        KeyAlgorithm::PS512 => Some(Algorithm::PS512),
        KeyAlgorithm::ES256 => Some(Algorithm::ES256),
        KeyAlgorithm::ES384 => Some(Algorithm::ES384),
        KeyAlgorithm::EdDSA => Some(Algorithm::EdDSA),
        _ => None,
    }
}
