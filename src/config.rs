use std::time::Duration;

use serde::Deserialize;

/// Per-class signing secrets and TTL policy. Each token class has its own
/// secret; TTLs are fixed per class, never per call.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub invite_secret: String,
    pub access_secret: String,
    pub refresh_secret: String,
    pub invite_ttl_minutes: i64,
    pub access_ttl_minutes: i64,
    pub refresh_cookie_ttl_days: i64,
}

impl TokenConfig {
    pub fn invite_ttl(&self) -> Duration {
        Duration::from_secs((self.invite_ttl_minutes as u64) * 60)
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs((self.access_ttl_minutes as u64) * 60)
    }

    /// Lifetime of the refresh cookie. Governs client retention only; the
    /// refresh token signature itself carries no expiry.
    pub fn refresh_cookie_ttl(&self) -> Duration {
        Duration::from_secs((self.refresh_cookie_ttl_days as u64) * 24 * 60 * 60)
    }
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub frontend_url: String,
    pub tokens: TokenConfig,
    pub hash: HashConfig,
    pub smtp: SmtpConfig,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Read configuration once at startup. Request handlers only ever see
    /// this struct, never the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let tokens = TokenConfig {
            invite_secret: std::env::var("INVITE_TOKEN_SECRET")?,
            access_secret: std::env::var("ACCESS_TOKEN_SECRET")?,
            refresh_secret: std::env::var("REFRESH_TOKEN_SECRET")?,
            invite_ttl_minutes: env_parse("INVITE_TTL_MINUTES", 15),
            access_ttl_minutes: env_parse("ACCESS_TTL_MINUTES", 15),
            refresh_cookie_ttl_days: env_parse("REFRESH_COOKIE_TTL_DAYS", 7),
        };
        let hash = HashConfig {
            memory_kib: env_parse("ARGON2_MEMORY_KIB", 19456),
            iterations: env_parse("ARGON2_ITERATIONS", 2),
            parallelism: env_parse("ARGON2_PARALLELISM", 1),
        };
        let smtp = SmtpConfig {
            host: std::env::var("SMTP_HOST")?,
            username: std::env::var("SMTP_USERNAME")?,
            password: std::env::var("SMTP_PASSWORD")?,
            from: std::env::var("SMTP_FROM").or_else(|_| std::env::var("SMTP_USERNAME"))?,
            timeout_secs: env_parse("SMTP_TIMEOUT_SECS", 10),
        };
        Ok(Self {
            database_url,
            frontend_url,
            tokens,
            hash,
            smtp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_helpers_convert_units() {
        let cfg = TokenConfig {
            invite_secret: "a".into(),
            access_secret: "b".into(),
            refresh_secret: "c".into(),
            invite_ttl_minutes: 15,
            access_ttl_minutes: 15,
            refresh_cookie_ttl_days: 7,
        };
        assert_eq!(cfg.invite_ttl(), Duration::from_secs(900));
        assert_eq!(cfg.access_ttl(), Duration::from_secs(900));
        assert_eq!(cfg.refresh_cookie_ttl(), Duration::from_secs(604_800));
    }
}
