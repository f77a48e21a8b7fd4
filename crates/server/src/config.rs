//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_CHAT_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_CHAT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("invalid allowed origin '{0}'")]
    Origin(String),

    #[error("invalid chat timeout '{0}', expected a positive number of seconds")]
    Timeout(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Only origin granted cross-origin access (the frontend dev server)
    pub allowed_origin: HeaderValue,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub chat_model: String,
    /// Upper bound on one Anthropic round trip
    pub chat_timeout: Duration,
}

impl ServerConfig {
    /// Reads `.env` (if any) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = get("LURE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|source| ConfigError::BindAddr { value: bind.clone(), source })?;

        let origin =
            get("LURE_ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());
        let allowed_origin = parse_origin(&origin)?;

        let chat_timeout = match get("LURE_CHAT_TIMEOUT_SECS") {
            Some(secs) => parse_timeout(&secs)?,
            None => DEFAULT_CHAT_TIMEOUT,
        };

        Ok(Self {
            bind_addr,
            allowed_origin,
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            anthropic_base_url: get("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            chat_model: get("LURE_CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            chat_timeout,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            allowed_origin: HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN),
            anthropic_api_key: None,
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            chat_timeout: DEFAULT_CHAT_TIMEOUT,
        }
    }
}

fn parse_timeout(secs: &str) -> Result<Duration, ConfigError> {
    match secs.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(Duration::from_secs(n)),
        _ => Err(ConfigError::Timeout(secs.to_string())),
    }
}

/// An origin is `scheme://host[:port]` with nothing after it.
fn parse_origin(origin: &str) -> Result<HeaderValue, ConfigError> {
    let invalid = || ConfigError::Origin(origin.to_string());

    let rest = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
        .ok_or_else(invalid)?;
    if rest.is_empty() || rest.contains('/') || rest.contains(char::is_whitespace) {
        return Err(invalid());
    }

    HeaderValue::from_str(origin).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.allowed_origin, DEFAULT_ALLOWED_ORIGIN);
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.anthropic_base_url, DEFAULT_ANTHROPIC_BASE_URL);
        assert_eq!(config.chat_model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.chat_timeout, DEFAULT_CHAT_TIMEOUT);
    }

    #[test]
    fn test_default_impl_matches_empty_env() {
        let from_env = config_from(&[]).unwrap();
        let default = ServerConfig::default();
        assert_eq!(from_env.bind_addr, default.bind_addr);
        assert_eq!(from_env.allowed_origin, default.allowed_origin);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("LURE_BIND_ADDR", "127.0.0.1:9100"),
            ("LURE_ALLOWED_ORIGIN", "https://lures.example.com"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("ANTHROPIC_BASE_URL", "http://127.0.0.1:4010/"),
            ("LURE_CHAT_MODEL", "claude-test"),
            ("LURE_CHAT_TIMEOUT_SECS", "15"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9100);
        assert_eq!(config.allowed_origin, "https://lures.example.com");
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.anthropic_base_url, "http://127.0.0.1:4010");
        assert_eq!(config.chat_model, "claude-test");
        assert_eq!(config.chat_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_chat_timeout() {
        for secs in ["0", "-5", "1.5", "soon"] {
            let err = config_from(&[("LURE_CHAT_TIMEOUT_SECS", secs)]).unwrap_err();
            assert!(matches!(err, ConfigError::Timeout(_)), "accepted {secs}");
        }
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = config_from(&[("ANTHROPIC_API_KEY", "   ")]).unwrap();
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = config_from(&[("LURE_BIND_ADDR", "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::BindAddr { .. }));
    }

    #[test]
    fn test_invalid_origins() {
        for origin in ["localhost:3000", "http://", "http://localhost:3000/app", "*"] {
            let err = config_from(&[("LURE_ALLOWED_ORIGIN", origin)]).unwrap_err();
            assert!(matches!(err, ConfigError::Origin(_)), "accepted {origin}");
        }
    }
}
