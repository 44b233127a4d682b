//! Timeout configuration for Druid client operations.

use std::time::Duration;

/// Timeouts applied to the HTTP round trip of each query.
///
/// A zero duration means "no timeout" for that phase. The defaults mirror
/// what an analytic query service needs: generous connection establishment
/// and an unbounded wait for results, since long-running queries are
/// normal.
///
/// # Examples
///
/// ```rust
/// use druid_link::DruidLinkTimeouts;
/// use std::time::Duration;
///
/// // Defaults: 300s to connect, wait forever for results
/// let timeouts = DruidLinkTimeouts::default();
///
/// // Bounded waits
/// let timeouts = DruidLinkTimeouts::builder()
///     .connection_timeout(Duration::from_secs(10))
///     .query_timeout(Duration::from_secs(120))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct DruidLinkTimeouts {
    /// Timeout for establishing the connection (TCP + TLS handshake).
    /// Default: 300 seconds.
    pub connection_timeout: Duration,

    /// Timeout for the full request/response cycle after connecting.
    /// Default: 0 (wait forever).
    pub query_timeout: Duration,
}

impl Default for DruidLinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(300),
            query_timeout: Duration::ZERO,
        }
    }
}

impl DruidLinkTimeouts {
    /// Create a new builder for custom timeout configuration.
    pub fn builder() -> DruidLinkTimeoutsBuilder {
        DruidLinkTimeoutsBuilder::new()
    }

    /// Timeouts suited to local development: fail fast instead of hanging.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            query_timeout: Duration::from_secs(10),
        }
    }

    /// Check if a duration represents "no timeout".
    pub fn is_no_timeout(duration: Duration) -> bool {
        duration.is_zero()
    }
}

/// Builder for [`DruidLinkTimeouts`].
#[derive(Debug, Clone)]
pub struct DruidLinkTimeoutsBuilder {
    timeouts: DruidLinkTimeouts,
}

impl DruidLinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: DruidLinkTimeouts::default(),
        }
    }

    /// Set the connection timeout (TCP + TLS handshake).
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    /// Set the connection timeout in seconds.
    pub fn connection_timeout_secs(self, secs: u64) -> Self {
        self.connection_timeout(Duration::from_secs(secs))
    }

    /// Set the query timeout. Zero waits forever.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.query_timeout = timeout;
        self
    }

    /// Set the query timeout in seconds. Zero waits forever.
    pub fn query_timeout_secs(self, secs: u64) -> Self {
        self.query_timeout(Duration::from_secs(secs))
    }

    /// Build the timeout configuration.
    pub fn build(self) -> DruidLinkTimeouts {
        self.timeouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let timeouts = DruidLinkTimeouts::default();
        assert_eq!(timeouts.connection_timeout, Duration::from_secs(300));
        assert!(timeouts.query_timeout.is_zero());
    }

    #[test]
    fn test_builder() {
        let timeouts = DruidLinkTimeouts::builder()
            .connection_timeout_secs(10)
            .query_timeout_secs(120)
            .build();

        assert_eq!(timeouts.connection_timeout, Duration::from_secs(10));
        assert_eq!(timeouts.query_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_fast_preset() {
        let timeouts = DruidLinkTimeouts::fast();
        assert!(timeouts.connection_timeout <= Duration::from_secs(5));
        assert!(!timeouts.query_timeout.is_zero());
    }

    #[test]
    fn test_is_no_timeout() {
        assert!(DruidLinkTimeouts::is_no_timeout(Duration::ZERO));
        assert!(!DruidLinkTimeouts::is_no_timeout(Duration::from_secs(1)));
    }
}
