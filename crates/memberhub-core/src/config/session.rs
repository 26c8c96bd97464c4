//! Web session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Web UI session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Default session lifetime in seconds (24 hours).
    #[serde(default = "default_duration")]
    pub duration_seconds: i64,
    /// "Remember me" session lifetime in seconds (30 days).
    #[serde(default = "default_remember_duration")]
    pub remember_duration_seconds: i64,
    /// Extend a session once less than this fraction of its duration remains.
    #[serde(default = "default_extend_threshold")]
    pub extend_threshold: f64,
    /// Interval between expired-session sweeps, in minutes.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_minutes: u64,
    /// Name of the cookie carrying the session identifier.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Capacity of the last-activity update queue.
    #[serde(default = "default_activity_capacity")]
    pub activity_queue_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_seconds: default_duration(),
            remember_duration_seconds: default_remember_duration(),
            extend_threshold: default_extend_threshold(),
            cleanup_interval_minutes: default_cleanup_interval(),
            cookie_name: default_cookie_name(),
            activity_queue_capacity: default_activity_capacity(),
        }
    }
}

impl SessionConfig {
    /// Default session lifetime.
    pub fn duration(&self) -> chrono::Duration {
        seconds(self.duration_seconds)
    }

    /// "Remember me" session lifetime.
    pub fn remember_duration(&self) -> chrono::Duration {
        seconds(self.remember_duration_seconds)
    }

    /// Interval between cleanup sweeps.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_minutes.max(1) * 60)
    }
}

/// Out-of-range values saturate; `AppConfig::validate` rejects them first.
fn seconds(value: i64) -> chrono::Duration {
    chrono::Duration::try_seconds(value).unwrap_or(chrono::Duration::MAX)
}

fn default_duration() -> i64 {
    86_400
}

fn default_remember_duration() -> i64 {
    2_592_000
}

fn default_extend_threshold() -> f64 {
    0.5
}

fn default_cleanup_interval() -> u64 {
    60
}

fn default_cookie_name() -> String {
    "session_id".to_string()
}

fn default_activity_capacity() -> usize {
    1024
}
