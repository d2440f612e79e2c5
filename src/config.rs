//! Daemon configuration: defaults mirror the production debounce/timeout
//! values; each is overridable by an environment variable so integration
//! tests can run with a short debounce instead of waiting seconds per case.

use std::time::Duration;

const DEFAULT_IDLE_MS: u64 = 10 * 60 * 1000;
const DEFAULT_FLUSH_MS: u64 = 2_000;

#[derive(Debug, Clone, Copy)]
pub struct DaemonConfig {
    pub no_daemon: bool,
    pub idle_timeout: Duration,
    pub flush_debounce: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            no_daemon: false,
            idle_timeout: Duration::from_millis(DEFAULT_IDLE_MS),
            flush_debounce: Duration::from_millis(DEFAULT_FLUSH_MS),
        }
    }
}

impl DaemonConfig {
    /// Reads `HWPCLI_NO_DAEMON`, `HWPCLI_DAEMON_IDLE_MS`, and
    /// `HWPCLI_DAEMON_FLUSH_MS`, falling back to the production defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("HWPCLI_NO_DAEMON") {
            config.no_daemon = value == "1";
        }
        if let Some(ms) = env_u64("HWPCLI_DAEMON_IDLE_MS") {
            config.idle_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("HWPCLI_DAEMON_FLUSH_MS") {
            config.flush_debounce = Duration::from_millis(ms);
        }

        config
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_values() {
        let config = DaemonConfig::default();
        assert!(!config.no_daemon);
        assert_eq!(config.flush_debounce, Duration::from_millis(2_000));
    }

    #[test]
    fn env_overrides_are_applied() {
        std::env::set_var("HWPCLI_DAEMON_FLUSH_MS", "100");
        std::env::set_var("HWPCLI_NO_DAEMON", "1");
        let config = DaemonConfig::from_env();
        assert_eq!(config.flush_debounce, Duration::from_millis(100));
        assert!(config.no_daemon);
        std::env::remove_var("HWPCLI_DAEMON_FLUSH_MS");
        std::env::remove_var("HWPCLI_NO_DAEMON");
    }
}
