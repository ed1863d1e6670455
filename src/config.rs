use std::time::Duration;

use thiserror::Error;

pub const EPHEMERAL_BIND_ADDR: &str = "127.0.0.1:0";
pub const DEFAULT_BIND_RETRY_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub bind_addr: Option<String>,
    pub bind_retry_delay: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bind address must be host:port, got {0:?}")]
    InvalidAddress(String),
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            bind_addr: None,
            bind_retry_delay: DEFAULT_BIND_RETRY_DELAY,
        }
    }
}

impl EndpointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = Some(addr.into());
        self
    }

    pub fn with_bind_retry_delay(mut self, delay: Duration) -> Self {
        self.bind_retry_delay = delay;
        self
    }

    /// Address handed to the listener. Hostnames are resolved at bind time.
    pub fn bind_target(&self) -> Result<String, ConfigError> {
        let Some(addr) = self.bind_addr.as_deref() else {
            return Ok(EPHEMERAL_BIND_ADDR.to_string());
        };

        let addr = addr.trim();
        let (host, port) = addr
            .rsplit_once(':')
            .ok_or_else(|| ConfigError::InvalidAddress(addr.to_string()))?;

        let host = match host.strip_prefix('[') {
            Some(bracketed) => bracketed
                .strip_suffix(']')
                .ok_or_else(|| ConfigError::InvalidAddress(addr.to_string()))?,
            // IPv6 hosts must be bracketed, otherwise the port is ambiguous.
            None if host.contains(':') => {
                return Err(ConfigError::InvalidAddress(addr.to_string()));
            }
            None => host,
        };
        if host.is_empty() || port.parse::<u16>().is_err() {
            return Err(ConfigError::InvalidAddress(addr.to_string()));
        }

        Ok(addr.to_string())
    }
}
