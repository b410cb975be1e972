use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Write a debug log file in addition to stderr output
    #[serde(default)]
    pub debug: bool,

    /// Debug log file (or directory). Defaults to a file next to config.toml.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_rotation: Option<DebugLogRotation>,

    /// Daily files to keep (0 keeps all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_keep: Option<usize>,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub google: GoogleSettings,

    #[serde(default)]
    pub pinterest: PinterestSettings,

    #[serde(default)]
    pub geo: GeoSettings,
}

impl Config {
    /// Overlay credentials and defaults from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Overlay values from an arbitrary lookup (environment in production,
    /// a map in tests). Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get("GOOGLE_API_KEY") {
            self.google.api_key = key;
        }
        if let Some(cx) = get("GOOGLE_SEARCH_ENGINE_ID") {
            self.google.search_engine_id = cx;
        }
        if let Some(country) = get("RAWS_SEARCH_DEFAULT_COUNTRY") {
            self.geo.default_country = country.to_ascii_uppercase();
        }
    }
}

/// Debug log rotation strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebugLogRotation {
    /// Append to a single file
    None,
    Daily,
}

/// Image providers the fallback chain can be built from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    Pinterest,
}

/// Aggregator behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Providers tried in this order
    #[serde(default = "default_provider_order")]
    pub provider_order: Vec<ProviderKind>,

    /// Per-provider call deadline
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    #[serde(default = "default_limit")]
    pub default_limit: u32,

    #[serde(default = "default_max_limit")]
    pub max_limit: u32,

    /// Provider merged with catalog results in the combined catalog search
    #[serde(default = "default_catalog_secondary")]
    pub catalog_secondary: Vec<ProviderKind>,
}

impl SearchSettings {
    /// Deadline clamped to 10..=15 seconds
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs.clamp(10, 15))
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider_order: default_provider_order(),
            provider_timeout_secs: default_provider_timeout_secs(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            catalog_secondary: default_catalog_secondary(),
        }
    }
}

/// Google Custom Search (image) credentials and request options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSettings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub search_engine_id: String,

    #[serde(default = "default_google_base_url")]
    pub base_url: String,

    /// small, medium, large, xlarge
    #[serde(default = "default_image_size")]
    pub image_size: String,

    /// photo, face, clipart, lineart, animated
    #[serde(default = "default_image_type")]
    pub image_type: String,

    /// active, high, medium, off
    #[serde(default = "default_safe_search")]
    pub safe_search: String,
}

impl GoogleSettings {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.search_engine_id.trim().is_empty()
    }
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            search_engine_id: String::new(),
            base_url: default_google_base_url(),
            image_size: default_image_size(),
            image_type: default_image_type(),
            safe_search: default_safe_search(),
        }
    }
}

/// Pinterest scraping target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinterestSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_pinterest_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Cap on pins taken from one page
    #[serde(default = "default_pinterest_max_results")]
    pub max_results: usize,
}

impl Default for PinterestSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_pinterest_base_url(),
            user_agent: default_user_agent(),
            max_results: default_pinterest_max_results(),
        }
    }
}

/// Client address geolocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoSettings {
    #[serde(default = "default_country")]
    pub default_country: String,

    /// TOML range table; without it every address resolves to the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self {
            default_country: default_country(),
            database_path: None,
        }
    }
}

fn default_provider_order() -> Vec<ProviderKind> {
    vec![ProviderKind::Google, ProviderKind::Pinterest]
}

fn default_catalog_secondary() -> Vec<ProviderKind> {
    vec![ProviderKind::Pinterest]
}

fn default_provider_timeout_secs() -> u64 {
    12
}

fn default_limit() -> u32 {
    20
}

fn default_max_limit() -> u32 {
    50
}

fn default_google_base_url() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_image_size() -> String {
    "medium".to_string()
}

fn default_image_type() -> String {
    "photo".to_string()
}

fn default_safe_search() -> String {
    "active".to_string()
}

fn default_true() -> bool {
    true
}

fn default_pinterest_base_url() -> String {
    "https://www.pinterest.com/search/pins/".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string()
}

fn default_pinterest_max_results() -> usize {
    15
}

fn default_country() -> String {
    crate::search::geo::DEFAULT_COUNTRY.to_string()
}
