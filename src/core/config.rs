//! Configuration management

use axum::http::HeaderValue;
use tracing::warn;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Origins allowed when `CORS_ALLOWED_ORIGINS` is not set
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] =
    &["https://localhost:3000", "http://localhost:3000"];

/// Process configuration, loaded once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// DeepL auth key; without it the translation routes answer 500
    pub auth_key: Option<String>,
    /// Listen port
    pub port: u16,
    /// Bind address
    pub host: String,
    /// Origins granted CORS access
    pub allowed_origins: Vec<String>,
    /// Provider base URL override
    pub server_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            auth_key: None,
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
            server_url: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let auth_key = non_empty("DEEPL_AUTH_KEY");

        let port = match non_empty("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| {
                anyhow::anyhow!("PORT must be a valid port number, got {:?}: {}", raw, e)
            })?,
            None => DEFAULT_PORT,
        };

        let host = non_empty("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let allowed_origins = match non_empty("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => Self::default().allowed_origins,
        };

        let server_url = non_empty("DEEPL_SERVER_URL");

        Ok(Self {
            auth_key,
            port,
            host,
            allowed_origins,
            server_url,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.host.is_empty() {
            return Err(anyhow::anyhow!("host is required"));
        }

        for origin in &self.allowed_origins {
            if HeaderValue::from_str(origin).is_err() {
                return Err(anyhow::anyhow!("invalid CORS origin: {:?}", origin));
            }
        }

        if self.allowed_origins.is_empty() {
            warn!("No CORS origins configured, browsers will reject cross-origin calls");
        }

        Ok(())
    }

    /// Address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
