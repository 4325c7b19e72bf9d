/// Fallback used when JWT_SECRET is not set. Fine for local development,
/// a real deployment must override it.
const DEV_JWT_SECRET: &str = "communityhub-dev-secret";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub secure_cookies: bool,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:data/community.db".into());
        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("JWT_SECRET not set; using the development fallback secret");
                DEV_JWT_SECRET.into()
            }
        };
        let jwt = JwtConfig {
            secret,
            ttl_days: std::env::var("SESSION_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        Ok(Self {
            database_url,
            jwt,
            secure_cookies: std::env::var("COOKIE_SECURE")
                .map(|v| v == "1" || v == "true")
                .unwrap_or(false),
            admin_email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@communityhub.local".into()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| "communityhub-admin".into()),
            admin_name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".into()),
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_days: 7,
            },
            secure_cookies: false,
            admin_email: "admin@test.local".into(),
            admin_password: "test-admin-password".into(),
            admin_name: "Test Admin".into(),
        }
    }
}
