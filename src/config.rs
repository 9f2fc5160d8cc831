use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Main configuration structure for Dugout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DugoutConfig {
    /// Record store connection
    pub store: StoreConfig,
    /// Negotiation workflow settings
    pub workflow: WorkflowConfig,
    /// Notification delivery settings
    pub notifications: NotificationConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Base URL of the hosted record store
    pub base_url: String,
    /// API token (usually set via DUGOUT_STORE_TOKEN)
    pub token: Option<String>,
    /// Workspace (tenant) all requests are scoped to
    pub workspace: String,
    /// Client-side rate limiting
    pub rate_limit: RateLimitConfig,
    /// TTL for cached list reads
    pub cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second limit
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// The operating team; used as the default scope for status and timeline
    pub team_id: Option<Uuid>,
    /// Days until a newly drafted contract expires, when not set explicitly
    pub default_expiry_days: Option<u32>,
    /// Page size when sweeping for lapsed contracts
    pub sweep_page_size: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Deliver notifications at all
    pub enabled: bool,
    /// Optional webhook receiving each notice as JSON
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Enable tracing spans
    pub tracing_enabled: bool,
    /// Log level
    pub log_level: String,
    /// Enable metrics collection
    pub metrics_enabled: bool,
}

impl Default for DugoutConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                base_url: String::new(), // Must come from dugout.toml or env
                token: None,             // Will be read from env var
                workspace: String::new(),
                rate_limit: RateLimitConfig {
                    requests_per_second: 10,
                    burst_capacity: 20,
                },
                cache_ttl_seconds: 300,
            },
            workflow: WorkflowConfig {
                team_id: None,
                default_expiry_days: None,
                sweep_page_size: 100,
            },
            notifications: NotificationConfig {
                enabled: true,
                webhook_url: None,
            },
            observability: ObservabilityConfig {
                tracing_enabled: true,
                log_level: "info".to_string(),
                metrics_enabled: true,
            },
        }
    }
}

impl DugoutConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (dugout.toml, .dugout-rc)
    /// 3. Environment variables (prefixed with DUGOUT_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&DugoutConfig::default())?);

        if Path::new("dugout.toml").exists() {
            builder = builder.add_source(File::with_name("dugout"));
        }

        if Path::new(".dugout-rc").exists() {
            builder = builder.add_source(File::with_name(".dugout-rc"));
        }

        builder = builder.add_source(
            Environment::with_prefix("DUGOUT")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut dugout_config: DugoutConfig = config.try_deserialize()?;

        // Token can come from the generic or the prefixed variable
        if dugout_config.store.token.is_none() {
            if let Ok(token) = std::env::var("STORE_TOKEN") {
                dugout_config.store.token = Some(token);
            } else if let Ok(token) = std::env::var("DUGOUT_STORE_TOKEN") {
                dugout_config.store.token = Some(token);
            }
        }

        Ok(dugout_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<DugoutConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = DugoutConfig::load_env_file();
        DugoutConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static DugoutConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
