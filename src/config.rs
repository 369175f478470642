use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the video insight client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Backend endpoints and transport settings
    pub gateway: GatewayConfig,

    /// Result list behaviour
    pub search: SearchConfig,

    /// Video playback settings
    pub playback: PlaybackConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    /// Origin the endpoint paths are resolved against
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    pub search_path: String,

    /// Prefix; the video id is appended as the last path segment
    pub analyze_path: String,

    pub report_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Results starting before this offset (seconds) pass the "recent" filter
    pub recent_threshold_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Path extensions treated as adaptive-bitrate manifests
    pub manifest_extensions: Vec<String>,

    /// Start playback as soon as the source is attached
    pub autoplay: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is not set
    pub level: String,
}

impl Config {
    /// Load configuration from the first config file found, then apply env overrides
    pub fn load() -> Result<Self> {
        let config_paths = ["video-insight.toml", "config/video-insight.toml"];

        for path in &config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config.with_env_overrides());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::default().with_env_overrides())
    }

    /// Load configuration from a specific TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment variables
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var("VIDEO_INSIGHT_BASE_URL") {
            self.gateway.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("VIDEO_INSIGHT_TIMEOUT") {
            self.gateway.timeout_seconds = timeout.parse().unwrap_or(self.gateway.timeout_seconds);
        }

        if let Ok(level) = std::env::var("VIDEO_INSIGHT_LOG_LEVEL") {
            self.logging.level = level;
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.as_ref().display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.gateway.base_url)
            .map_err(|e| anyhow!("Invalid base_url '{}': {}", self.gateway.base_url, e))?;

        if self.gateway.timeout_seconds == 0 {
            return Err(anyhow!("timeout_seconds must be greater than 0"));
        }

        for path in [
            &self.gateway.search_path,
            &self.gateway.analyze_path,
            &self.gateway.report_path,
        ] {
            if !path.starts_with('/') {
                return Err(anyhow!("Endpoint path '{}' must start with '/'", path));
            }
        }

        if !(self.search.recent_threshold_seconds > 0.0) {
            return Err(anyhow!("recent_threshold_seconds must be positive"));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Video Insight Configuration:\n\
            - Base URL: {}\n\
            - Timeout: {}s\n\
            - Recent threshold: {}s\n\
            - Manifest extensions: {}\n\
            - Log level: {}",
            self.gateway.base_url,
            self.gateway.timeout_seconds,
            self.search.recent_threshold_seconds,
            self.playback.manifest_extensions.join(", "),
            self.logging.level
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
                timeout_seconds: 120, // analysis generation is slow
                search_path: "/search".to_string(),
                analyze_path: "/analyze".to_string(),
                report_path: "/generate-report".to_string(),
            },
            search: SearchConfig {
                recent_threshold_seconds: 60.0,
            },
            playback: PlaybackConfig {
                manifest_extensions: vec!["m3u8".to_string()],
                autoplay: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.gateway.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.gateway.timeout_seconds = seconds;
        self
    }

    pub fn with_recent_threshold(mut self, seconds: f64) -> Self {
        self.config.search.recent_threshold_seconds = seconds;
        self
    }

    pub fn with_manifest_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.playback.manifest_extensions = extensions;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
