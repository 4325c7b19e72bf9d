use axum::{
    extract::{FromRef, State},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{AuthResponse, LoginRequest, MeResponse, PublicUser, SignupRequest};
use super::extractors::{Session, AUTH_COOKIE};
use super::jwt::JwtKeys;
use super::password::{hash_password, verify_password};
use super::repo::{Role, User};

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn session_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(time::Duration::days(config.jwt.ttl_days))
        .build()
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let email = payload.email.as_deref().map(str::trim).unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();
    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();

    if email.is_empty() || password.is_empty() || name.is_empty() {
        return Err(ApiError::Validation("All fields required".into()));
    }
    if !is_valid_email(email) {
        warn!("signup with invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if password.chars().count() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    if User::find_by_email(&state.db, email).await?.is_some() {
        warn!(email = %email, "signup with registered email");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(password)?;
    let user = User::create(&state.db, email, &hash, name, Role::User).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(&user.identity())?;
    let jar = jar.add(session_cookie(token, &state.config));

    info!(user_id = %user.id, "user signed up");
    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let email = payload.email.as_deref().map(str::trim).unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("Email and password required".into()));
    }

    // Unknown email and wrong password answer identically.
    let user = match User::find_by_email(&state.db, email).await? {
        Some(u) => u,
        None => {
            warn!("login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };
    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(&user.identity())?;
    let jar = jar.add(session_cookie(token, &state.config));

    info!(user_id = %user.id, "user logged in");
    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/").build());
    (jar, Json(json!({ "success": true })))
}

/// Reflects the session cookie; no database lookup.
#[instrument(skip(session))]
pub async fn me(session: Session) -> Json<MeResponse> {
    let user = match session {
        Session::Authenticated(identity) => Some(identity),
        Session::Anonymous => None,
    };
    Json(MeResponse { user })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("someone@example.com"));
        assert!(!is_valid_email("someone@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two words@example.com"));
    }

    #[tokio::test]
    async fn signup_rejects_five_character_password() {
        let state = AppState::for_tests().await;
        let result = signup(
            State(state),
            CookieJar::new(),
            Json(SignupRequest {
                email: Some("short@example.com".into()),
                password: Some("12345".into()),
                name: Some("Short".into()),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn password_minimum_counts_characters_not_bytes() {
        let state = AppState::for_tests().await;

        // Three accented characters take six bytes but are still too short.
        let result = signup(
            State(state.clone()),
            CookieJar::new(),
            Json(SignupRequest {
                email: Some("accents@example.com".into()),
                password: Some("ééé".into()),
                name: Some("Accents".into()),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert!(User::find_by_email(&state.db, "accents@example.com")
            .await
            .expect("query")
            .is_none());

        // Six accented characters satisfy the minimum.
        let result = signup(
            State(state),
            CookieJar::new(),
            Json(SignupRequest {
                email: Some("accents@example.com".into()),
                password: Some("éééééé".into()),
                name: Some("Accents".into()),
            }),
        )
        .await;
        assert!(result.is_ok());
    }

    #[test]
    fn session_cookie_attributes() {
        let config = AppConfig::for_tests();
        let cookie = session_cookie("tok".into(), &config);
        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
    }
}
