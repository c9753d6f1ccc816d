//! Runtime configuration assembled from the command line.

use shared::{DEFAULT_HEIGHT, DEFAULT_PORT, DEFAULT_WIDTH};
use std::time::Duration;

pub const DEFAULT_OBSTACLES: usize = 30;
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_MESSAGE_EXPIRY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub width: usize,
    pub height: usize,
    /// Random wall cells scattered outside the treasure structure
    pub obstacles: usize,
    /// A session that sends nothing for this long is dropped
    pub recv_timeout: Duration,
    pub message_expiry: Duration,
    /// Fixed seed for a reproducible board
    pub seed: Option<u64>,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            obstacles: DEFAULT_OBSTACLES,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
            message_expiry: DEFAULT_MESSAGE_EXPIRY,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "127.0.0.1:65000");
        assert_eq!(config.width, 80);
        assert_eq!(config.height, 30);
        assert_eq!(config.obstacles, 30);
        assert_eq!(config.recv_timeout, Duration::from_secs(300));
    }
}
