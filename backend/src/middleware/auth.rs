//! Authentication extractor
//!
//! Access tokens are issued by the hosted backend's auth service and signed
//! with the project's shared JWT secret. Write endpoints take a
//! [`CurrentUser`]; read endpoints are public.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::AppError;
use crate::AppState;

/// Roles allowed to manage any listing
const ADMIN_ROLES: [&str; 2] = ["admin", "service_role"];

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Option<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .map(|role| ADMIN_ROLES.contains(&role))
            .unwrap_or(false)
    }

    /// Owner of the record or an administrator
    pub fn can_manage(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.is_admin()
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub role: Option<String>,
    pub aud: String,
    pub exp: i64,
}

/// Decode and validate an access token
pub fn decode_token(token: &str, jwt: &JwtConfig) -> Result<AuthUser, AppError> {
    let mut validation = Validation::default();
    validation.set_audience(&[jwt.audience.as_str()]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AppError::InvalidToken
    })?
    .claims;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))?;

    Ok(AuthUser {
        user_id,
        role: claims.role,
    })
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;

        decode_token(token, &state.config.jwt).map(CurrentUser)
    }
}
