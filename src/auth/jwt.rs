use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::state::AppState;

use super::repo::Role;

/// The verified caller: everything a handler may learn from a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    role: Role,
    iat: usize,
    exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_days: i64,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self::new(&jwt.secret, jwt.ttl_days)
    }
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_days,
        }
    }

    pub fn issue(&self, identity: &Identity) -> anyhow::Result<String> {
        self.issue_at(identity, OffsetDateTime::now_utc())
    }

    /// Clock seam: expiry is relative to the supplied `now`.
    pub fn issue_at(&self, identity: &Identity, now: OffsetDateTime) -> anyhow::Result<String> {
        let exp = now + Duration::days(self.ttl_days);
        let claims = Claims {
            sub: identity.user_id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %identity.user_id, "session token issued");
        Ok(token)
    }

    /// Signature and expiry are checked together; every failure collapses
    /// to `None` so callers cannot tell why a token was rejected.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).ok()?;
        Some(Identity {
            user_id: data.claims.sub,
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new("test-secret", 7)
    }

    fn identity() -> Identity {
        Identity {
            user_id: "user-1".into(),
            email: "someone@example.com".into(),
            role: Role::User,
        }
    }

    #[test]
    fn issue_then_verify_returns_same_identity() {
        let keys = keys();
        let id = identity();
        let token = keys.issue(&id).expect("issue");
        assert_eq!(keys.verify(&token), Some(id));
    }

    #[test]
    fn expired_token_is_invalid() {
        let keys = keys();
        let eight_days_ago = OffsetDateTime::now_utc() - Duration::days(8);
        let token = keys.issue_at(&identity(), eight_days_ago).expect("issue");
        assert_eq!(keys.verify(&token), None);
    }

    #[test]
    fn token_within_ttl_is_valid() {
        let keys = keys();
        let six_days_ago = OffsetDateTime::now_utc() - Duration::days(6);
        let token = keys.issue_at(&identity(), six_days_ago).expect("issue");
        assert!(keys.verify(&token).is_some());
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let keys = keys();
        let token = keys.issue(&identity()).expect("issue");

        // Flip one character in the payload segment.
        let payload_start = token.find('.').expect("header separator") + 1;
        let target = payload_start + 4;
        let mut bytes = token.into_bytes();
        bytes[target] = if bytes[target] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).expect("utf8");

        assert_eq!(keys.verify(&tampered), None);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = keys().issue(&identity()).expect("issue");
        let other = JwtKeys::new("a-different-secret", 7);
        assert_eq!(other.verify(&token), None);
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(keys().verify("not-a-token"), None);
        assert_eq!(keys().verify(""), None);
    }
}
