/*
 * Responsibility
 * - 環境変数や設定の読み込み (公開パス, JWT 検証鍵, issuer/audience など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 起動後は不変 (実行時の変更なし)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

pub const DEFAULT_PUBLIC_PATH_PATTERNS: &str = "/public/**,/swagger-ui/**,/v3/api-docs/**";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    Conflict(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::Conflict(keys) => write!(f, "conflicting configuration: {}", keys),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where the verification keys come from. Exactly one source is configured.
#[derive(Clone)]
pub enum KeySource {
    PublicKeyPem { pem: String, algorithm: Algorithm },
    HmacSecret { secret_base64: String, algorithm: Algorithm },
    JwksFile { path: String },
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            Self::PublicKeyPem { algorithm, .. } => f
                .debug_struct("PublicKeyPem")
                .field("algorithm", algorithm)
                .finish_non_exhaustive(),
            Self::HmacSecret { algorithm, .. } => f
                .debug_struct("HmacSecret")
                .field("algorithm", algorithm)
                .finish_non_exhaustive(),
            Self::JwksFile { path } => f.debug_struct("JwksFile").field("path", path).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub key_source: KeySource,
    pub issuer: Option<String>,
    pub audiences: Vec<String>,
    pub leeway_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Evaluated in this order: protected first, then public. First match wins.
    pub protected_path_patterns: Vec<String>,
    pub public_path_patterns: Vec<String>,

    pub jwt: JwtConfig,
    pub http: HttpConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let public_path_patterns = split_list(
            &lookup("PUBLIC_PATH_PATTERNS")
                .unwrap_or_else(|| DEFAULT_PUBLIC_PATH_PATTERNS.to_string()),
        );
        let protected_path_patterns =
            split_list(&lookup("PROTECTED_PATH_PATTERNS").unwrap_or_default());

        let jwt = JwtConfig {
            key_source: key_source(&lookup)?,
            issuer: issuer(lookup("JWT_ISSUER"))?,
            audiences: split_list(&lookup("JWT_AUDIENCES").unwrap_or_default()),
            leeway_seconds: parse_or(&lookup, "JWT_LEEWAY_SECONDS", 60)?,
        };

        let http = HttpConfig {
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECONDS",
                30,
            )?),
            body_limit_bytes: parse_or(&lookup, "REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?,
        };

        Ok(Self {
            addr,
            app_env,
            protected_path_patterns,
            public_path_patterns,
            jwt,
            http,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn algorithm<F>(lookup: &F, default: Algorithm) -> Result<Algorithm, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("JWT_ALGORITHM") {
        Some(raw) => Algorithm::from_str(raw.trim()).map_err(|_| ConfigError::Invalid("JWT_ALGORITHM")),
        None => Ok(default),
    }
}

fn key_source<F>(lookup: &F) -> Result<KeySource, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let pem = lookup("JWT_PUBLIC_KEY_PEM").filter(|v| !v.trim().is_empty());
    let secret = lookup("JWT_HMAC_SECRET_BASE64").filter(|v| !v.trim().is_empty());
    let jwks = lookup("JWT_JWKS_PATH").filter(|v| !v.trim().is_empty());

    match (pem, secret, jwks) {
        (Some(pem), None, None) => Ok(KeySource::PublicKeyPem {
            // Allow single-line env values with escaped newlines
            pem: pem.replace("\\n", "\n"),
            algorithm: algorithm(lookup, Algorithm::EdDSA)?,
        }),
        (None, Some(secret_base64), None) => Ok(KeySource::HmacSecret {
            secret_base64,
            algorithm: algorithm(lookup, Algorithm::HS256)?,
        }),
        (None, None, Some(path)) => Ok(KeySource::JwksFile { path }),
        (None, None, None) => Err(ConfigError::Missing(
            "JWT_PUBLIC_KEY_PEM | JWT_HMAC_SECRET_BASE64 | JWT_JWKS_PATH",
        )),
        _ => Err(ConfigError::Conflict(
            "JWT_PUBLIC_KEY_PEM, JWT_HMAC_SECRET_BASE64 and JWT_JWKS_PATH are mutually exclusive",
        )),
    }
}

// Issuers that look like URLs must parse as one; the original string is kept
// because `iss` is compared verbatim.
fn issuer(raw: Option<String>) -> Result<Option<String>, ConfigError> {
    let Some(raw) = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if raw.contains("://") {
        url::Url::parse(&raw).map_err(|_| ConfigError::Invalid("JWT_ISSUER"))?;
    }
    Ok(Some(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_with_a_single_key_source() {
        let c = config(&[("JWT_HMAC_SECRET_BASE64", "c2VjcmV0")]).unwrap();

        assert_eq!(c.addr.port(), 3000);
        assert_eq!(c.app_env, AppEnv::Development);
        assert_eq!(
            c.public_path_patterns,
            vec!["/public/**", "/swagger-ui/**", "/v3/api-docs/**"]
        );
        assert!(c.protected_path_patterns.is_empty());
        assert!(matches!(
            c.jwt.key_source,
            KeySource::HmacSecret {
                algorithm: Algorithm::HS256,
                ..
            }
        ));
        assert_eq!(c.jwt.leeway_seconds, 60);
        assert!(c.jwt.issuer.is_none());
        assert!(c.jwt.audiences.is_empty());
        assert_eq!(c.http.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn key_source_is_required() {
        assert!(matches!(config(&[]), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn key_sources_are_mutually_exclusive() {
        let err = config(&[
            ("JWT_HMAC_SECRET_BASE64", "c2VjcmV0"),
            ("JWT_JWKS_PATH", "/etc/jwks.json"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Conflict(_)));
    }

    #[test]
    fn pem_defaults_to_eddsa_and_unescapes_newlines() {
        let c = config(&[("JWT_PUBLIC_KEY_PEM", "-----BEGIN-----\\nabc\\n-----END-----")]).unwrap();
        let KeySource::PublicKeyPem { pem, algorithm } = c.jwt.key_source else {
            panic!("expected pem source");
        };
        assert_eq!(pem, "-----BEGIN-----\nabc\n-----END-----");
        assert_eq!(algorithm, Algorithm::EdDSA);
    }

    #[test]
    fn lists_and_numbers_are_parsed() {
        let c = config(&[
            ("JWT_JWKS_PATH", "/etc/jwks.json"),
            ("PORT", "8080"),
            ("APP_ENV", "PROD"),
            ("PUBLIC_PATH_PATTERNS", " /public/** , GET /docs/**,, "),
            ("PROTECTED_PATH_PATTERNS", "/public/admin/**"),
            ("JWT_ISSUER", "https://idp.footstars.test"),
            ("JWT_AUDIENCES", "footstars-api, footstars-admin"),
            ("JWT_LEEWAY_SECONDS", "5"),
            ("REQUEST_TIMEOUT_SECONDS", "3"),
        ])
        .unwrap();

        assert_eq!(c.addr.port(), 8080);
        assert!(c.app_env.is_production());
        assert_eq!(c.public_path_patterns, vec!["/public/**", "GET /docs/**"]);
        assert_eq!(c.protected_path_patterns, vec!["/public/admin/**"]);
        assert_eq!(c.jwt.issuer.as_deref(), Some("https://idp.footstars.test"));
        assert_eq!(c.jwt.audiences, vec!["footstars-api", "footstars-admin"]);
        assert_eq!(c.jwt.leeway_seconds, 5);
        assert_eq!(c.http.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn invalid_values_are_reported_by_key() {
        let base = ("JWT_JWKS_PATH", "/etc/jwks.json");
        assert_eq!(
            config(&[base, ("PORT", "eighty")]).unwrap_err(),
            ConfigError::Invalid("PORT")
        );
        assert_eq!(
            config(&[base, ("JWT_ISSUER", "https://exa mple.com")]).unwrap_err(),
            ConfigError::Invalid("JWT_ISSUER")
        );
        assert_eq!(
            config(&[("JWT_HMAC_SECRET_BASE64", "c2VjcmV0"), ("JWT_ALGORITHM", "HS1024")])
                .unwrap_err(),
            ConfigError::Invalid("JWT_ALGORITHM")
        );
    }

    #[test]
    fn plain_string_issuers_are_allowed() {
        let c = config(&[("JWT_JWKS_PATH", "/x"), ("JWT_ISSUER", "footstars-idp")]).unwrap();
        assert_eq!(c.jwt.issuer.as_deref(), Some("footstars-idp"));
    }
}
