//! Bearer token authentication middleware
//!
//! Tokens are issued by an external identity provider. RS256 is used when a
//! public key is configured, otherwise HS256 with a shared secret.

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::config::Config;
use crate::domain::entities::UpsertUser;
use crate::error::AppError;

/// Token claims used by the API
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Roles,
}

/// Identity providers send roles as a single string or a list
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum Roles {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl Roles {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Roles::None => Vec::new(),
            Roles::One(role) => vec![role],
            Roles::Many(roles) => roles,
        }
    }
}

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub is_admin: bool,
}

impl AuthUser {
    /// Identity used to create or refresh the local user record
    pub fn to_upsert(&self) -> UpsertUser {
        let display_name = self
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.subject.clone());

        UpsertUser {
            external_id: self.subject.clone(),
            email: self.email.clone(),
            display_name,
        }
    }
}

pub struct JwtValidator {
    key: DecodingKey,
    validation: Validation,
    admin_role: String,
}

impl JwtValidator {
    pub fn from_config(config: &Config) -> Result<Self, jsonwebtoken::errors::Error> {
        let (key, algorithm) = match (&config.jwt_public_key_pem, &config.jwt_secret) {
            (Some(pem), _) => (
                DecodingKey::from_rsa_pem(pem.replace("\\n", "\n").as_bytes())?,
                Algorithm::RS256,
            ),
            (None, Some(secret)) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            (None, None) => {
                return Err(jsonwebtoken::errors::ErrorKind::InvalidKeyFormat.into());
            }
        };

        Ok(Self::new(
            key,
            algorithm,
            config.jwt_issuer.as_deref(),
            config.jwt_audience.as_deref(),
            &config.admin_role,
        ))
    }

    /// HS256 validator without issuer or audience checks
    pub fn hs256(secret: &str, admin_role: &str) -> Self {
        Self::new(
            DecodingKey::from_secret(secret.as_bytes()),
            Algorithm::HS256,
            None,
            None,
            admin_role,
        )
    }

    fn new(
        key: DecodingKey,
        algorithm: Algorithm,
        issuer: Option<&str>,
        audience: Option<&str>,
        admin_role: &str,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key,
            validation,
            admin_role: admin_role.to_string(),
        }
    }

    /// Validate a raw token and build the caller
    pub fn validate(&self, token: &str) -> Result<AuthUser, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Unauthorized
        })?;

        let claims = data.claims;
        let roles = claims.roles.into_vec();
        let is_admin = roles.iter().any(|r| r.eq_ignore_ascii_case(&self.admin_role));

        Ok(AuthUser {
            subject: claims.sub,
            email: claims.email,
            name: claims.name,
            roles,
            is_admin,
        })
    }
}

/// Extract the token from the Authorization header
fn extract_bearer(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware
///
/// Validates the bearer token and injects the `AuthUser` into request
/// extensions. Routes that require authentication should use this middleware.
pub async fn require_auth(
    State(validator): State<Arc<JwtValidator>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(&request).ok_or(AppError::Unauthorized)?;
    let user = validator.validate(token)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
