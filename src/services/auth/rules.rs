//! Route classification: an ordered table of path patterns mapped to
//! `Public` / `Protected`.
//!
//! Pattern syntax (Ant / Spring `PathPattern` style):
//! - `/orders`        literal segments
//! - `/static/*.css`  `*` and `?` inside a single segment
//! - `/orders/{id}`   exactly one non-empty segment
//! - `/public/**`     zero or more trailing segments (`{*rest}` is equivalent)
//!
//! An optional method prefix restricts a rule: `GET /docs/**`.
//! First match wins; anything unmatched is `Protected`.
use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern must start with '/': {0}")]
    MissingLeadingSlash(String),
    #[error("'**' is only allowed as the last segment: {0}")]
    MultiWildcardNotLast(String),
    #[error("invalid path variable in pattern: {0}")]
    InvalidVariable(String),
    #[error("invalid method in pattern: {0}")]
    InvalidMethod(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Glob(String),
    Variable,
    // `**` / `{*rest}`; always last
    Rest,
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let raw = raw.trim();
        let body = raw
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(raw.to_string()))?;

        let parts: Vec<&str> = body.split('/').collect();
        let last = parts.len() - 1;

        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = if *part == "**" || (part.starts_with("{*") && part.ends_with('}')) {
                if i != last {
                    return Err(PatternError::MultiWildcardNotLast(raw.to_string()));
                }
                Segment::Rest
            } else if part.starts_with('{') {
                let valid = part
                    .strip_prefix('{')
                    .and_then(|p| p.strip_suffix('}'))
                    .is_some_and(|n| {
                        !n.is_empty() && n.chars().all(|c| c.is_alphanumeric() || c == '_')
                    });
                if !valid {
                    return Err(PatternError::InvalidVariable(raw.to_string()));
                }
                Segment::Variable
            } else if part.contains('*') || part.contains('?') {
                Segment::Glob(part.to_string())
            } else {
                Segment::Literal(part.to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path. The caller is responsible for rejecting
    /// non-normalized paths first (see [`is_normalized`]).
    pub fn matches(&self, path: &str) -> bool {
        let Some(body) = path.strip_prefix('/') else {
            return false;
        };
        let parts: Vec<&str> = body.split('/').collect();

        for (i, segment) in self.segments.iter().enumerate() {
            if *segment == Segment::Rest {
                return true;
            }
            let Some(part) = parts.get(i) else {
                return false;
            };
            let ok = match segment {
                Segment::Literal(lit) => lit == part,
                Segment::Glob(glob) => glob_match(glob, part),
                Segment::Variable => !part.is_empty(),
                Segment::Rest => true,
            };
            if !ok {
                return false;
            }
        }

        parts.len() == self.segments.len()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// `*` matches any run of characters, `?` exactly one; both stay inside a segment.
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

/// Paths that could be resolved differently downstream (dot segments, empty
/// segments, encoded separators) never match a rule.
pub fn is_normalized(path: &str) -> bool {
    if !path.starts_with('/') || path.contains("//") || path.contains('\\') || path.contains(';')
    {
        return false;
    }

    let lower = path.to_ascii_lowercase();
    if ["%2e", "%2f", "%5c", "%25"].iter().any(|enc| lower.contains(enc)) {
        return false;
    }

    !path.split('/').any(|seg| seg == "." || seg == "..")
}

// Only the standard methods; a typo must not silently become an extension method.
fn parse_method(raw: &str) -> Option<Method> {
    let method = Method::from_str(&raw.to_ascii_uppercase()).ok()?;
    [
        Method::GET,
        Method::HEAD,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
        Method::TRACE,
        Method::CONNECT,
    ]
    .contains(&method)
    .then_some(method)
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub pattern: PathPattern,
    pub methods: Option<Vec<Method>>,
    pub access: Access,
}

impl RouteRule {
    pub fn new(pattern: PathPattern, access: Access) -> Self {
        Self {
            pattern,
            methods: None,
            access,
        }
    }

    /// Parse `"/public/**"` or `"GET /docs/**"`.
    pub fn parse(rule: &str, access: Access) -> Result<Self, PatternError> {
        let rule = rule.trim();
        match rule.split_once(char::is_whitespace) {
            Some((method, pattern)) if !method.starts_with('/') => {
                let method = parse_method(method)
                    .ok_or_else(|| PatternError::InvalidMethod(rule.to_string()))?;
                Ok(Self {
                    pattern: PathPattern::parse(pattern)?,
                    methods: Some(vec![method]),
                    access,
                })
            }
            _ => Ok(Self::new(PathPattern::parse(rule)?, access)),
        }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        let method_ok = self
            .methods
            .as_ref()
            .is_none_or(|methods| methods.contains(method));
        method_ok && self.pattern.matches(path)
    }
}

/// Ordered, immutable rule table. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct RouteRules {
    rules: Vec<RouteRule>,
}

impl RouteRules {
    /// Protected rules first, then public ones; mirrors the config layout.
    pub fn from_patterns<P, Q>(protected: P, public: Q) -> Result<Self, PatternError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        Q: IntoIterator,
        Q::Item: AsRef<str>,
    {
        let mut rules = Vec::new();
        for p in protected {
            rules.push(RouteRule::parse(p.as_ref(), Access::Protected)?);
        }
        for p in public {
            rules.push(RouteRule::parse(p.as_ref(), Access::Public)?);
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn classify(&self, method: &Method, path: &str) -> Access {
        if !is_normalized(path) {
            return Access::Protected;
        }

        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.access)
            .unwrap_or(Access::Protected)
    }
}
