use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::featured::FEATURED_LIMIT;
use crate::schedule::{DEFAULT_TIMEZONE, HoursRow, default_hours};
use crate::visits::FileStorage;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub business: BusinessConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    pub carousel: CarouselConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessConfig {
    pub name: String,
    pub tagline: String,
    pub phone: String,
    /// Phone number as digits only, used for WhatsApp links.
    pub phone_digits: String,
    pub email: String,
    pub address: String,
    /// IANA timezone the hours are kept in.
    pub timezone: String,
    #[serde(default = "default_hours")]
    pub hours: Vec<HoursRow>,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            name: "CMS MEXICAN FOODS, LLC.".to_string(),
            tagline: "Distribuidores para restaurantes – Harina de maíz, especias y más"
                .to_string(),
            phone: "(210) 776-9278".to_string(),
            phone_digits: "12107769278".to_string(),
            email: "cmsmexicanfoods@gmail.com".to_string(),
            address: "5718 Business Park, San Antonio, TX 78218".to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            hours: default_hours(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Where `products.json` and `locales/<lang>.json` are served from.
    pub base_url: String,
    /// Visit counter file; defaults to the user data directory.
    #[serde(default)]
    pub visits_path: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            visits_path: None,
        }
    }
}

impl DataConfig {
    pub fn visits_path(&self) -> PathBuf {
        self.visits_path
            .clone()
            .unwrap_or_else(FileStorage::default_path)
    }
}

/// Fetches are one-shot and wait as long as the server takes unless a
/// timeout is set here.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct NetworkConfig {
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CarouselConfig {
    pub interval_ms: u64,
    pub featured_limit: usize,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval_ms: 4000,
            featured_limit: FEATURED_LIMIT,
        }
    }
}

impl CarouselConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present)
        let _ = dotenvy::dotenv();

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cms-catalog");

        let business = BusinessConfig::default();

        let builder = Config::builder()
            // 1. Load default values
            // Business
            .set_default("business.name", business.name)?
            .set_default("business.tagline", business.tagline)?
            .set_default("business.phone", business.phone)?
            .set_default("business.phone_digits", business.phone_digits)?
            .set_default("business.email", business.email)?
            .set_default("business.address", business.address)?
            .set_default("business.timezone", business.timezone)?
            // Data sources
            .set_default("data.base_url", "http://localhost:3000")?
            // Carousel
            .set_default("carousel.interval_ms", 4000)?
            .set_default("carousel.featured_limit", FEATURED_LIMIT as u64)?

            // 2. Load from local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))

            // 3. Load from user config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))

            // 4. Load from Environment variables (CMS__DATA__BASE_URL=...)
            .add_source(Environment::with_prefix("CMS").separator("__"));

        let s = builder.build()?;
        Ok(s.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Default Value Tests ====================

    #[test]
    fn test_network_config_defaults_to_no_timeout() {
        let config = NetworkConfig::default();
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.connect_timeout_secs, None);
    }

    #[test]
    fn test_business_config_defaults() {
        let config = BusinessConfig::default();
        assert_eq!(config.timezone, "America/Chicago");
        assert_eq!(config.phone_digits, "12107769278");
        assert_eq!(config.hours.len(), 3);
    }

    #[test]
    fn test_carousel_config_defaults() {
        let config = CarouselConfig::default();
        assert_eq!(config.interval(), Duration::from_millis(4000));
        assert_eq!(config.featured_limit, 5);
    }

    #[test]
    fn test_visits_path_defaults_to_data_dir() {
        let config = DataConfig::default();
        assert_eq!(config.visits_path(), FileStorage::default_path());

        let custom = DataConfig {
            visits_path: Some(PathBuf::from("/tmp/visits.json")),
            ..DataConfig::default()
        };
        assert_eq!(custom.visits_path(), PathBuf::from("/tmp/visits.json"));
    }

    // ==================== Config Loading Tests ====================

    #[test]
    fn test_config_load_with_defaults() {
        // Should succeed even without a config file (uses defaults)
        let result = AppConfig::load();
        assert!(result.is_ok(), "{:?}", result.err());
    }

    #[test]
    fn test_loaded_config_has_expected_structure() {
        let config = AppConfig::load().expect("Config should load");

        assert!(!config.data.base_url.is_empty());
        assert!(!config.business.phone_digits.is_empty());
        assert!(config.carousel.interval_ms > 0);
        assert!(!config.business.hours.is_empty());
    }

    // ==================== Environment Variable Override Tests ====================

    /// Helper to safely set and remove environment variables in tests.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        // SAFETY: Test environment, each test uses its own key
        unsafe {
            std::env::set_var(key, value);
        }
        let result = f();
        unsafe {
            std::env::remove_var(key);
        }
        result
    }

    #[test]
    fn test_env_var_overrides_base_url() {
        let config = with_env_var("CMS__DATA__BASE_URL", "https://cdn.example.com", || {
            AppConfig::load().expect("Config should load")
        });

        assert_eq!(config.data.base_url, "https://cdn.example.com");
    }

    #[test]
    fn test_env_var_sets_request_timeout() {
        let config = with_env_var("CMS__NETWORK__REQUEST_TIMEOUT_SECS", "45", || {
            AppConfig::load().expect("Config should load")
        });

        assert_eq!(config.network.request_timeout_secs, Some(45));
        assert_eq!(config.network.connect_timeout_secs, None);
    }

    #[test]
    fn test_env_var_overrides_carousel_interval() {
        let config = with_env_var("CMS__CAROUSEL__INTERVAL_MS", "2500", || {
            AppConfig::load().expect("Config should load")
        });

        assert_eq!(config.carousel.interval_ms, 2500);
    }
}
