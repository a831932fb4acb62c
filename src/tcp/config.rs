use super::WrappingU32;
use std::time::Duration;
use thiserror::Error as ThisError;

/// Parameters shared by a sender and a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpConfig {
    /// The retransmission timeout used before any backoff
    pub rt_timeout: Duration,
    /// How many bytes the receiver may hold unread or unassembled
    pub recv_capacity: usize,
    /// How many bytes the application may queue for sending
    pub send_capacity: usize,
    /// The largest payload placed in a single segment
    pub max_payload_size: usize,
    /// How many back-to-back retransmissions a connection tolerates before
    /// giving up
    pub max_retx_attempts: u32,
    /// Use this ISN instead of a random one
    pub fixed_isn: Option<WrappingU32>,
}

impl TcpConfig {
    pub const DEFAULT_CAPACITY: usize = 64000;
    pub const MAX_PAYLOAD_SIZE: usize = 1000;
    pub const TIMEOUT_DEFAULT: Duration = Duration::from_millis(1000);
    pub const MAX_RETX_ATTEMPTS: u32 = 8;

    /// Checks that the configuration describes a usable connection.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rt_timeout.is_zero() {
            Err(ConfigError::ZeroTimeout)?
        }
        if self.recv_capacity == 0 || self.send_capacity == 0 {
            Err(ConfigError::ZeroCapacity)?
        }
        if self.max_payload_size == 0 {
            Err(ConfigError::ZeroPayload)?
        }
        Ok(())
    }
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            rt_timeout: Self::TIMEOUT_DEFAULT,
            recv_capacity: Self::DEFAULT_CAPACITY,
            send_capacity: Self::DEFAULT_CAPACITY,
            max_payload_size: Self::MAX_PAYLOAD_SIZE,
            max_retx_attempts: Self::MAX_RETX_ATTEMPTS,
            fixed_isn: None,
        }
    }
}

/// An error in a [`TcpConfig`]
#[derive(Debug, ThisError, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
    #[error("The retransmission timeout must be nonzero")]
    ZeroTimeout,
    #[error("Stream capacities must be nonzero")]
    ZeroCapacity,
    #[error("The maximum payload size must be nonzero")]
    ZeroPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = TcpConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.rt_timeout, Duration::from_millis(1000));
        assert_eq!(config.max_payload_size, 1000);
    }

    #[test]
    fn rejects_degenerate_values() {
        let config = TcpConfig {
            rt_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));

        let config = TcpConfig {
            recv_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));

        let config = TcpConfig {
            max_payload_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPayload));
    }
}
