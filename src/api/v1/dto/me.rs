use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::auth::Claims;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub subject: Option<String>,
    pub issuer: Option<String>,
    pub audiences: Vec<String>,
    pub scopes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl MeResponse {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            subject: claims.sub.clone(),
            issuer: claims.iss.clone(),
            audiences: claims.audiences().into_iter().map(str::to_string).collect(),
            scopes: claims.scopes().into_iter().map(str::to_string).collect(),
            expires_at: claims.expires_at(),
        }
    }
}
