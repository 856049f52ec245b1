//! CLI command definitions and handlers

use clap::Subcommand;
use tracing::info;

use crate::core::config::ServerConfig;

/// Commands for DeepL Proxy
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP proxy (the default when no command is given)
    Serve {
        /// Bind address (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve {
            host: None,
            port: None,
        }
    }
}

/// Apply command-line overrides on top of the loaded configuration
pub fn apply_overrides(
    mut config: ServerConfig,
    auth_key: Option<String>,
    host: Option<String>,
    port: Option<u16>,
) -> ServerConfig {
    if let Some(auth_key) = auth_key.filter(|key| !key.trim().is_empty()) {
        config.auth_key = Some(auth_key.trim().to_string());
    }
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    config
}

/// Handle server command
pub async fn handle_serve(config: ServerConfig) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    info!("Starting HTTP server on {}", config.bind_address());
    info!("Allowed CORS origins: {}", config.allowed_origins.join(", "));

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_loaded_values() {
        let config = apply_overrides(
            ServerConfig::default(),
            Some("key:fx".to_string()),
            Some("127.0.0.1".to_string()),
            Some(8080),
        );

        assert_eq!(config.auth_key.as_deref(), Some("key:fx"));
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_blank_auth_key_override_is_ignored() {
        let loaded = ServerConfig {
            auth_key: Some("from-env".to_string()),
            ..Default::default()
        };

        let config = apply_overrides(loaded, Some(" ".to_string()), None, None);

        assert_eq!(config.auth_key.as_deref(), Some("from-env"));
        assert_eq!(config.port, 3000);
    }
}
