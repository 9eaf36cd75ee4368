//! Load — config loading from file and environment variables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::EngineConfig;

impl EngineConfig {
    /// Load configuration from file or environment variables.
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("LOGLENS_CONFIG_FILE")
            .unwrap_or_else(|_| "/etc/loglens/engine.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!(
                "Config file not found at {}, using environment variables",
                config_path
            );
            Self::from_env()
        };

        // Environment variables override file config.
        if let Some(v) = env_usize("LOGLENS_SAMPLE_LINES") {
            config.sample_lines = v;
        }
        if let Some(v) = env_u32("LOGLENS_TARGET_BUCKETS") {
            config.target_buckets = v;
        }
        if let Some(v) = env_usize("LOGLENS_BAR_WIDTH") {
            config.bar_width = v;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: EngineConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sample_lines: env_usize("LOGLENS_SAMPLE_LINES").unwrap_or(defaults.sample_lines),
            target_buckets: env_u32("LOGLENS_TARGET_BUCKETS").unwrap_or(defaults.target_buckets),
            bar_width: env_usize("LOGLENS_BAR_WIDTH").unwrap_or(defaults.bar_width),
        }
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}
