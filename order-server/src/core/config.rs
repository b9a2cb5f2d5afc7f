//! Server configuration
//!
//! All settings come from environment variables with sensible defaults:
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/order-server | Database and log files |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | IDEMPOTENCY_RETENTION_HOURS | 24 | Ledger entry retention window |
//! | IDEMPOTENCY_SWEEP_INTERVAL_SECS | 3600 | How often the GC task runs |
//! | LOG_LEVEL | info | tracing level filter |
//! | LOG_DIR | (stdout) | Daily-rolling log file directory |
//!
//! # Example
//!
//! ```ignore
//! WORK_DIR=/data/orders HTTP_PORT=8080 cargo run
//! ```

use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// How long consumed idempotency keys are kept before GC
    pub idempotency_retention_hours: u64,
    /// Interval between ledger GC sweeps
    pub idempotency_sweep_interval_secs: u64,
    /// tracing level filter
    pub log_level: String,
    /// Optional directory for daily-rolling log files
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/order-server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            idempotency_retention_hours: std::env::var("IDEMPOTENCY_RETENTION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            idempotency_sweep_interval_secs: std::env::var("IDEMPOTENCY_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Path of the order database file
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("orders.redb")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_lives_under_work_dir() {
        let config = Config {
            work_dir: "/tmp/orders-test".into(),
            http_port: 3000,
            environment: "development".into(),
            idempotency_retention_hours: 24,
            idempotency_sweep_interval_secs: 3600,
            log_level: "info".into(),
            log_dir: None,
        };
        assert_eq!(
            config.db_path(),
            PathBuf::from("/tmp/orders-test/orders.redb")
        );
    }
}
