//! Configuration management for the parking console.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// Console configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Load the demo collections at startup
    pub seed_demo_data: bool,
    /// Days between issue date and default due date of new tickets
    pub payment_due_days: u32,
    /// Number of entries in the dashboard activity feed
    pub recent_activity_limit: usize,
    /// Maximum follow-up actions a single store send may dispatch
    pub max_dispatch_depth: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            log_filter: "info,parking_console=debug".to_string(),
            seed_demo_data: true,
            payment_due_days: 14,
            recent_activity_limit: 10,
            max_dispatch_depth: 16,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_filter: lookup("CONSOLE_LOG").unwrap_or(defaults.log_filter),
            seed_demo_data: lookup("CONSOLE_SEED_DEMO_DATA")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.seed_demo_data),
            payment_due_days: lookup("CONSOLE_PAYMENT_DUE_DAYS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.payment_due_days),
            recent_activity_limit: lookup("CONSOLE_RECENT_ACTIVITY_LIMIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.recent_activity_limit),
            max_dispatch_depth: lookup("CONSOLE_MAX_DISPATCH_DEPTH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_dispatch_depth),
        }
    }
}
