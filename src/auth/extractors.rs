use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;

use crate::error::ApiError;
use crate::state::AppState;

use super::jwt::{Identity, JwtKeys};
use super::repo::Role;

pub const AUTH_COOKIE: &str = "auth_token";

/// What the session cookie proved about the caller. Extraction never fails;
/// a missing, malformed or expired token simply means `Anonymous`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated(Identity),
}

impl Session {
    pub fn from_token(keys: &JwtKeys, token: Option<&str>) -> Self {
        match token {
            Some(t) if !t.is_empty() => match keys.verify(t) {
                Some(identity) => Session::Authenticated(identity),
                None => Session::Anonymous,
            },
            _ => Session::Anonymous,
        }
    }

    /// Any authenticated caller.
    pub fn require_user(self) -> Result<Identity, ApiError> {
        match self {
            Session::Authenticated(identity) => Ok(identity),
            Session::Anonymous => Err(ApiError::Unauthorized),
        }
    }

    /// Authenticated and admin. Non-admins get the same answer as anonymous
    /// callers; the response never explains which check failed.
    pub fn require_admin(self) -> Result<Identity, ApiError> {
        match self {
            Session::Authenticated(identity) if identity.role == Role::Admin => Ok(identity),
            _ => Err(ApiError::Unauthorized),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let keys = JwtKeys::from_ref(state);
        Ok(Session::from_token(
            &keys,
            jar.get(AUTH_COOKIE).map(|c| c.value()),
        ))
    }
}

/// Extractor form of `require_user`.
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = match Session::from_request_parts(parts, state).await {
            Ok(s) => s,
            Err(never) => match never {},
        };
        session.require_user().map(AuthUser)
    }
}

/// Extractor form of `require_admin`.
pub struct AdminUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = match Session::from_request_parts(parts, state).await {
            Ok(s) => s,
            Err(never) => match never {},
        };
        session.require_admin().map(AdminUser)
    }
}
