//! Streaming transport settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeouts for [`StreamingWriter`](crate::StreamingWriter).
///
/// Stored as milliseconds so the struct reads naturally from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Bound on each socket write.  A viewer slower than this drops the
    /// connection rather than stalling the sender.
    pub write_timeout_ms: u64,

    /// Bound on each connection attempt.
    pub connect_timeout_ms: u64,

    /// Minimum gap between reconnection attempts.  Frames published while
    /// waiting are discarded.
    pub reconnect_interval_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            write_timeout_ms:      250,
            connect_timeout_ms:    1_000,
            reconnect_interval_ms: 2_000,
        }
    }
}

impl StreamConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.max(1))
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}
