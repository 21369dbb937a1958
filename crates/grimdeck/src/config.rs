//! Server configuration, read from the environment with sane defaults.

use std::time::Duration as StdDuration;

use chrono::Duration;

/// Runtime configuration for a Grimdeck server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: String,

    /// SQLite connection URL for the room store.
    pub database_url: String,

    /// How often the background sweep fires.
    pub sweep_interval: StdDuration,

    /// Rooms idle longer than this are purged from storage.
    pub room_ttl: Duration,

    /// Chains untouched longer than this are expired.
    pub chain_ttl: Duration,

    /// Unleased in-memory documents idle longer than this are saved
    /// and evicted.
    pub doc_idle: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_url: "sqlite://grimdeck.db?mode=rwc".to_string(),
            sweep_interval: StdDuration::from_secs(5 * 60),
            room_ttl: Duration::hours(1),
            chain_ttl: Duration::minutes(5),
            doc_idle: Duration::minutes(10),
        }
    }
}

impl ServerConfig {
    /// Builds a config from `GRIMDECK_ADDR` / `GRIMDECK_DATABASE_URL`,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("GRIMDECK_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(url) = std::env::var("GRIMDECK_DATABASE_URL") {
            config.database_url = url;
        }
        config
    }
}
