//! Server configuration

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Configuration error: {0}")]
pub struct ConfigError(pub String);

/// ID token validation settings
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Shared HS256 secret of the identity provider
    pub jwt_secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,

    /// Built front-end bundle
    pub static_dir: PathBuf,

    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = optional("AUTH_JWT_SECRET")
            .ok_or_else(|| ConfigError("AUTH_JWT_SECRET not set".into()))?;

        Ok(Self {
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            static_dir: optional("STATIC_DIR").unwrap_or_else(|| "static".into()).into(),
            auth: AuthConfig {
                jwt_secret,
                issuer: optional("AUTH_JWT_ISSUER"),
                audience: optional("AUTH_JWT_AUDIENCE"),
            },
        })
    }
}
