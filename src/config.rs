use std::env;
use std::time::Duration;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub scoring_url: String,
    pub dataset_path: String,
    pub debounce_ms: u64,
    pub scoring_timeout_secs: u64,
    pub top_factors: usize,
    pub command_channel_buffer: usize,
    pub rust_log: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `SCORING_URL` (default: http://127.0.0.1:8000/api)
    /// - `DATASET_PATH` (default: data/telco_customer_churn.csv)
    /// - `DEBOUNCE_MS` (default: 300)
    /// - `SCORING_TIMEOUT_SECS` (default: 10)
    /// - `TOP_FACTORS` (default: 3)
    /// - `COMMAND_CHANNEL_BUFFER` (default: 256)
    ///
    /// Unparseable numbers fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let scoring_url = env::var("SCORING_URL").unwrap_or_else(|_| "http://127.0.0.1:8000/api".to_string());

        if !scoring_url.starts_with("http://") && !scoring_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "SCORING_URL must start with http:// or https://".to_string(),
            ));
        }

        let dataset_path =
            env::var("DATASET_PATH").unwrap_or_else(|_| "data/telco_customer_churn.csv".to_string());

        let top_factors = parse_or("TOP_FACTORS", 3usize);
        if top_factors == 0 {
            return Err(ConfigError::InvalidValue("TOP_FACTORS must be at least 1".to_string()));
        }

        Ok(Self {
            scoring_url,
            dataset_path,
            debounce_ms: parse_or("DEBOUNCE_MS", 300),
            scoring_timeout_secs: parse_or("SCORING_TIMEOUT_SECS", 10),
            top_factors,
            command_channel_buffer: parse_or("COMMAND_CHANNEL_BUFFER", 256usize).max(1),
            rust_log: env::var("RUST_LOG").ok(),
        })
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn scoring_timeout(&self) -> Duration {
        Duration::from_secs(self.scoring_timeout_secs)
    }
}

fn parse_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    env::var(var).ok().and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // env vars are process-global; serialize the tests touching them
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "SCORING_URL",
        "DATASET_PATH",
        "DEBOUNCE_MS",
        "SCORING_TIMEOUT_SECS",
        "TOP_FACTORS",
        "COMMAND_CHANNEL_BUFFER",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.scoring_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.dataset_path, "data/telco_customer_churn.csv");
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.quiet_period(), Duration::from_millis(300));
        assert_eq!(config.scoring_timeout(), Duration::from_secs(10));
        assert_eq!(config.top_factors, 3);
        assert_eq!(config.command_channel_buffer, 256);
    }

    #[test]
    fn test_custom_config() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("SCORING_URL", "https://scoring.internal/api");
        env::set_var("DEBOUNCE_MS", "120");
        env::set_var("TOP_FACTORS", "5");
        env::set_var("SCORING_TIMEOUT_SECS", "not-a-number");

        let config = Config::from_env().unwrap();

        assert_eq!(config.scoring_url, "https://scoring.internal/api");
        assert_eq!(config.debounce_ms, 120);
        assert_eq!(config.top_factors, 5);
        assert_eq!(config.scoring_timeout_secs, 10);

        clear_env();
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("SCORING_URL", "ftp://scoring");
        assert!(matches!(Config::from_env(), Err(ConfigError::InvalidValue(_))));

        env::set_var("SCORING_URL", "http://scoring");
        env::set_var("TOP_FACTORS", "0");
        assert!(matches!(Config::from_env(), Err(ConfigError::InvalidValue(_))));

        clear_env();
    }
}
