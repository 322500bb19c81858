//! Caller authentication
//!
//! The identity provider issues HS256 ID tokens; callers send them as
//! `Authorization: Bearer <token>`. A missing or invalid token is not an
//! error here: the handler simply sees no caller and the service answers
//! `unauthenticated`.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use checkout_payments::CallerIdentity;

use crate::config::AuthConfig;
use crate::state::AppState;

/// ID token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject (user ID)
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    pub iat: i64,
    pub exp: i64,
}

pub struct TokenVerifier {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
    issuer: Option<String>,
    audience: Option<String>,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match &config.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        if let Some(iss) = &config.issuer {
            validation.set_issuer(&[iss]);
        }

        Self {
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    /// Validate a raw token and return who it belongs to
    pub fn verify(&self, token: &str) -> Result<CallerIdentity, jsonwebtoken::errors::Error> {
        let claims = decode::<IdTokenClaims>(token, &self.decoding, &self.validation)?.claims;

        Ok(CallerIdentity {
            uid: claims.sub,
            email: claims.email,
        })
    }

    /// Mint a token for `uid`, for local development and tests
    pub fn issue(
        &self,
        uid: &str,
        ttl: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = IdTokenClaims {
            sub: uid.to_string(),
            email: None,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Resolve the caller from an `Authorization` header value
    pub fn caller_from_header(&self, header: Option<&str>) -> Option<CallerIdentity> {
        let token = header?.strip_prefix("Bearer ")?.trim();
        if token.is_empty() {
            return None;
        }

        match self.verify(token) {
            Ok(caller) => Some(caller),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected ID token");
                None
            }
        }
    }
}

/// Authenticated caller, if any
#[derive(Debug, Clone)]
pub struct Caller(pub Option<CallerIdentity>);

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        Ok(Self(state.tokens.caller_from_header(header)))
    }
}
