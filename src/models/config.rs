//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend selection and local store location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Remote document store connection
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Weather feed settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// News feed settings
    #[serde(default)]
    pub news: NewsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Secrets and the backend flag are owned by the deployment, so they
    /// win over the file.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(flag) = lookup("LOCALHUB_USE_REMOTE") {
            self.storage.use_remote = matches!(flag.trim(), "true" | "1" | "yes");
        }
        if let Some(project_id) = lookup("FIRESTORE_PROJECT_ID") {
            self.remote.project_id = project_id;
        }
        if let Some(api_key) = lookup("FIRESTORE_API_KEY") {
            self.remote.api_key = Some(api_key);
        }
        if let Some(token) = lookup("FIRESTORE_AUTH_TOKEN") {
            self.remote.auth_token = Some(token);
        }
        if let Some(host) = lookup("FIRESTORE_EMULATOR_HOST") {
            self.remote.base_url = format!("http://{}/v1", host.trim_end_matches('/'));
        }
        if let Some(api_key) = lookup("NEWS_API_KEY") {
            self.news.api_key = Some(api_key);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.weather.cache_ttl_secs == 0 {
            return Err(AppError::validation("weather.cache_ttl_secs must be > 0"));
        }
        if self.news.cache_ttl_secs == 0 {
            return Err(AppError::validation("news.cache_ttl_secs must be > 0"));
        }
        if self.news.page_size == 0 || self.news.page_size > 100 {
            return Err(AppError::validation("news.page_size must be in 1..=100"));
        }
        if self.storage.use_remote {
            if self.remote.project_id.trim().is_empty() {
                return Err(AppError::validation(
                    "remote.project_id is required when storage.use_remote is set",
                ));
            }
        } else if self.storage.local_dir.as_os_str().is_empty() {
            return Err(AppError::validation("storage.local_dir is empty"));
        }
        Ok(())
    }

    /// Remote connection settings that are not filled in.
    pub fn missing_remote_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.remote.project_id.trim().is_empty() {
            missing.push("FIRESTORE_PROJECT_ID");
        }
        if self.remote.api_key.as_deref().is_none_or(str::is_empty)
            && self.remote.auth_token.as_deref().is_none_or(str::is_empty)
        {
            missing.push("FIRESTORE_API_KEY");
        }
        missing
    }
}

/// Backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Use the remote document store instead of the local one
    #[serde(default)]
    pub use_remote: bool,

    /// Directory holding the local category files
    #[serde(default = "defaults::local_dir")]
    pub local_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            use_remote: false,
            local_dir: defaults::local_dir(),
        }
    }
}

/// Remote document store (Firestore REST) connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Cloud project that owns the database
    #[serde(default)]
    pub project_id: String,

    /// Database id within the project
    #[serde(default = "defaults::database")]
    pub database: String,

    /// REST API root
    #[serde(default = "defaults::firestore_base_url")]
    pub base_url: String,

    /// Web API key sent as the `key` query parameter
    #[serde(default)]
    pub api_key: Option<String>,

    /// Bearer token sent in the Authorization header
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            database: defaults::database(),
            base_url: defaults::firestore_base_url(),
            api_key: None,
            auth_token: None,
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Weather forecast feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "defaults::weather_url")]
    pub api_url: String,

    #[serde(default = "defaults::latitude")]
    pub latitude: f64,

    #[serde(default = "defaults::longitude")]
    pub longitude: f64,

    #[serde(default = "defaults::timezone")]
    pub timezone: String,

    /// Location name put on snapshots
    #[serde(default = "defaults::location")]
    pub location: String,

    #[serde(default = "defaults::weather_ttl")]
    pub cache_ttl_secs: u64,
}

impl WeatherConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::weather_url(),
            latitude: defaults::latitude(),
            longitude: defaults::longitude(),
            timezone: defaults::timezone(),
            location: defaults::location(),
            cache_ttl_secs: defaults::weather_ttl(),
        }
    }
}

/// News aggregation feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "defaults::news_url")]
    pub api_url: String,

    #[serde(default = "defaults::news_query")]
    pub query: String,

    #[serde(default = "defaults::news_language")]
    pub language: String,

    #[serde(default = "defaults::news_page_size")]
    pub page_size: u32,

    #[serde(default = "defaults::news_sort_by")]
    pub sort_by: String,

    /// Usually supplied through `NEWS_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "defaults::news_ttl")]
    pub cache_ttl_secs: u64,
}

impl NewsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::news_url(),
            query: defaults::news_query(),
            language: defaults::news_language(),
            page_size: defaults::news_page_size(),
            sort_by: defaults::news_sort_by(),
            api_key: None,
            cache_ttl_secs: defaults::news_ttl(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Storage defaults
    pub fn local_dir() -> PathBuf {
        PathBuf::from("storage")
    }

    // Remote defaults
    pub fn database() -> String {
        "(default)".into()
    }
    pub fn firestore_base_url() -> String {
        "https://firestore.googleapis.com/v1".into()
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; LocalHub/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Weather defaults
    pub fn weather_url() -> String {
        "https://api.open-meteo.com/v1/forecast".into()
    }
    pub fn latitude() -> f64 {
        34.84
    }
    pub fn longitude() -> f64 {
        32.06
    }
    pub fn timezone() -> String {
        "Asia/Jerusalem".into()
    }
    pub fn location() -> String {
        "Israel".into()
    }
    pub fn weather_ttl() -> u64 {
        10 * 60
    }

    // News defaults
    pub fn news_url() -> String {
        "https://newsapi.org/v2/everything".into()
    }
    pub fn news_query() -> String {
        "news".into()
    }
    pub fn news_language() -> String {
        "he".into()
    }
    pub fn news_page_size() -> u32 {
        10
    }
    pub fn news_sort_by() -> String {
        "publishedAt".into()
    }
    pub fn news_ttl() -> u64 {
        15 * 60
    }
}
