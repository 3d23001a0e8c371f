use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use catalog::pager::{DEFAULT_PAGE_SIZE, PAGE_SIZES};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::{debug, warn};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "tienda-admin.toml";

/// Application settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Backend API host (e.g., "localhost" or "api.example.com")
    pub api_host: String,

    /// Backend API port (e.g., 3000)
    pub api_port: u16,

    /// API path prefix (e.g., "/api")
    pub api_path: String,

    /// Use HTTPS for API requests
    pub api_use_https: bool,

    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Notification duration in milliseconds
    pub toast_duration_ms: u64,

    /// Rows per page when none is requested
    pub default_page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_host: "localhost".to_string(),
            api_port: 3000,
            api_path: "/api".to_string(),
            api_use_https: false,
            request_timeout_ms: 30000,
            toast_duration_ms: 5000,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Get the full API base URL
    pub fn api_base_url(&self) -> String {
        let protocol = if self.api_use_https { "https" } else { "http" };
        format!(
            "{}://{}:{}{}",
            protocol, self.api_host, self.api_port, self.api_path
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    /// The configured page size if it is one of the offered sizes.
    pub fn page_size(&self) -> usize {
        if PAGE_SIZES.contains(&self.default_page_size) {
            self.default_page_size
        } else {
            warn!(
                "Page size {} is not one of {:?}, using {}",
                self.default_page_size, PAGE_SIZES, DEFAULT_PAGE_SIZE
            );
            DEFAULT_PAGE_SIZE
        }
    }
}

/// Loads settings from defaults, the optional config file and `TIENDA_*`
/// environment variables, in that order of precedence.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let defaults = AppConfig::default();
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let config = Config::builder()
        .set_default("api_host", defaults.api_host)?
        .set_default("api_port", i64::from(defaults.api_port))?
        .set_default("api_path", defaults.api_path)?
        .set_default("api_use_https", defaults.api_use_https)?
        .set_default("request_timeout_ms", defaults.request_timeout_ms as i64)?
        .set_default("toast_duration_ms", defaults.toast_duration_ms as i64)?
        .set_default("default_page_size", defaults.default_page_size as i64)?
        .add_source(file)
        .add_source(Environment::with_prefix("TIENDA").try_parsing(true))
        .build()?;

    let settings: AppConfig = config.try_deserialize()?;
    debug!("Loaded configuration: {:?}", settings);
    Ok(settings)
}
