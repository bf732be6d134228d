use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the ingestion service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port the HTTP server binds on.
    pub port: u16,

    /// Maximum number of events retained in the rolling history.
    pub max_events: usize,

    /// Location of the JSON snapshot file.
    pub data_path: PathBuf,

    /// Shared secret for signature verification. `None` disables the check.
    pub secret: Option<String>,

    /// Upper bound on a single durable write.
    pub persist_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 1420,
            max_events: 100,
            data_path: PathBuf::from("data/github-webhooks.json"),
            secret: None,
            persist_timeout: Duration::from_millis(2_000),
        }
    }
}

impl ServerConfig {
    /// Build a config from `WEBHOOK_*` environment variables, falling back
    /// to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_u16("WEBHOOK_PORT", defaults.port),
            max_events: env_usize("WEBHOOK_MAX_EVENTS", defaults.max_events),
            data_path: env::var("WEBHOOK_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            secret: env::var("WEBHOOK_SECRET")
                .ok()
                .and_then(|s| (!s.trim().is_empty()).then_some(s)),
            persist_timeout: Duration::from_millis(env_u64(
                "WEBHOOK_PERSIST_TIMEOUT_MS",
                defaults.persist_timeout.as_millis() as u64,
            )),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
    }
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 1420);
        assert_eq!(config.max_events, 100);
        assert_eq!(config.data_path, PathBuf::from("data/github-webhooks.json"));
        assert!(config.secret.is_none());
        assert_eq!(config.persist_timeout, Duration::from_millis(2_000));
    }

    #[test]
    fn bind_addr_uses_configured_port() {
        let config = ServerConfig {
            port: 9099,
            ..Default::default()
        };
        assert_eq!(config.bind_addr().port(), 9099);
    }
}
