use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use storage::models::AdminUser;
use uuid::Uuid;

use crate::error::WebError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub exp: usize,
}

/// HS256 keys for issuing and checking admin tokens.
#[derive(Clone)]
pub struct JwtKeys {
    inner: Arc<JwtKeysInner>,
}

struct JwtKeysInner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            inner: Arc::new(JwtKeysInner {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                ttl: chrono::Duration::hours(ttl_hours),
            }),
        }
    }

    pub fn issue(&self, user: &AdminUser) -> Result<String, jsonwebtoken::errors::Error> {
        let expiration = chrono::Utc::now() + self.inner.ttl;
        let claims = Claims {
            sub: user.admin_user_id,
            username: user.username.clone(),
            role: user.role.clone(),
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.inner.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.inner.decoding, &Validation::default())
            .map(|data| data.claims)
    }
}

/// Rejects requests without a valid `Authorization: Bearer <token>` header.
///
/// On success the decoded [`Claims`] are available as a request extension.
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| {
            WebError::Unauthorized("Missing or invalid authorization token".to_string())
        })?;

    let claims = keys.verify(token).map_err(|e| {
        tracing::warn!("Rejected admin token: {}", e);
        WebError::Unauthorized("Token expired or invalid".to_string())
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
