//! Runtime configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";
pub const PRODUCTION_COOKIE_DOMAIN: &str = ".ai-tutor.co.kr";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POST_LOGIN_REDIRECT: &str = "/home";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl HttpTimeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Attributes shared by the `aiTutorToken` and `refreshToken` cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub environment: Environment,
    pub cookies: CookiePolicy,
    pub timeouts: HttpTimeouts,
    pub port: u16,
    pub post_login_redirect: String,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `AI_TUTOR_API_BASE_URL`: backend base URL, default `http://127.0.0.1:8080`
    /// - `AI_TUTOR_ENV`: `development` (default) or `production`
    /// - `COOKIE_DOMAIN`: defaults to `.ai-tutor.co.kr` in production, unset otherwise
    /// - `COOKIE_SECURE`: boolean override, defaults to production
    /// - `AI_TUTOR_REQUEST_TIMEOUT_SECS`: default 60
    /// - `AI_TUTOR_CONNECT_TIMEOUT_SECS`: default 10
    /// - `PORT`: default 3000
    /// - `POST_LOGIN_REDIRECT`: default `/home`
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown environment name or an unparsable port.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = parse_environment(std::env::var("AI_TUTOR_ENV").ok().as_deref())?;
        let api_base_url = normalize_base_url(
            &std::env::var("AI_TUTOR_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned()),
        );

        let domain = match std::env::var("COOKIE_DOMAIN") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(value.trim().to_owned()),
            Err(_) => environment
                .is_production()
                .then(|| PRODUCTION_COOKIE_DOMAIN.to_owned()),
        };
        let secure = env_bool("COOKIE_SECURE").unwrap_or(environment.is_production());

        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("AI_TUTOR_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("AI_TUTOR_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Parse(format!("invalid PORT: {raw}")))?,
            Err(_) => DEFAULT_PORT,
        };

        let post_login_redirect =
            std::env::var("POST_LOGIN_REDIRECT").unwrap_or_else(|_| DEFAULT_POST_LOGIN_REDIRECT.to_owned());

        Ok(Self {
            api_base_url,
            environment,
            cookies: CookiePolicy { secure, domain },
            timeouts,
            port,
            post_login_redirect,
        })
    }

    /// Development defaults pointed at `api_base_url`.
    #[must_use]
    pub fn for_base_url(api_base_url: &str) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url),
            environment: Environment::Development,
            cookies: CookiePolicy { secure: false, domain: None },
            timeouts: HttpTimeouts::default(),
            port: DEFAULT_PORT,
            post_login_redirect: DEFAULT_POST_LOGIN_REDIRECT.to_owned(),
        }
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_environment(raw: Option<&str>) -> Result<Environment, ConfigError> {
    match raw.map(str::trim).unwrap_or("development") {
        "development" | "dev" | "" => Ok(Environment::Development),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(ConfigError::Parse(format!("unknown AI_TUTOR_ENV: {other}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
