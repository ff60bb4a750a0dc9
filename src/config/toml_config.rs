use crate::adapters::google_translate::DEFAULT_TRANSLATE_ENDPOINT;
use crate::adapters::nominatim::DEFAULT_GEOCODE_ENDPOINT;
use crate::core::offers::{DEFAULT_FALLBACK_RADIUS_KM, DEFAULT_MAX_OFFERS};
use crate::core::ConfigProvider;
use crate::utils::error::{OfferError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = concat!("nearby-offers/", env!("CARGO_PKG_VERSION"));

/// File-based configuration. Every section and every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: Option<ServiceConfig>,
    pub directory: Option<DirectoryConfig>,
    pub translation: Option<TranslationConfig>,
    pub geocoding: Option<GeocodingConfig>,
    pub search: Option<SearchSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Base directory for the local storage backend.
    pub base_path: Option<String>,
    pub snapshot: Option<String>,
    pub localities_csv: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub ttl_seconds: Option<u64>,
    pub cache_capacity: Option<usize>,
    pub max_text_length: Option<usize>,
    pub base64_min_length: Option<usize>,
    pub opaque_prefixes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub country_codes: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub cache_ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSection {
    pub fallback_radius_km: Option<f64>,
    pub max_offers: Option<usize>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OfferError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OfferError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| OfferError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn service_name(&self) -> &str {
        self.service
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .unwrap_or("nearby-offers")
    }

    pub fn base_path(&self) -> &str {
        self.directory
            .as_ref()
            .and_then(|d| d.base_path.as_deref())
            .unwrap_or(".")
    }

    fn translation(&self) -> TranslationConfig {
        self.translation.clone().unwrap_or_default()
    }

    fn geocoding(&self) -> GeocodingConfig {
        self.geocoding.clone().unwrap_or_default()
    }

    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_path("directory.base_path", self.base_path())?;
        validate_file_extension("directory.snapshot", self.snapshot_path(), &["json"])?;
        if let Some(csv) = self.localities_csv_path() {
            validate_file_extension("directory.localities_csv", csv, &["csv"])?;
        }

        validate_url("translation.endpoint", self.translate_endpoint())?;
        validate_url("geocoding.endpoint", self.geocode_endpoint())?;
        validate_non_empty_string("service.user_agent", self.user_agent())?;

        validate_positive_number("translation.cache_capacity", self.cache_capacity(), 1)?;
        validate_positive_number("translation.max_text_length", self.max_text_length(), 1)?;
        validate_positive_number("search.max_offers", self.max_offers(), 1)?;
        validate_range("search.fallback_radius_km", self.fallback_radius_km(), 0.0, 500.0)?;

        for (field, value) in [
            ("translation.timeout_seconds", self.translation().timeout_seconds),
            ("translation.ttl_seconds", self.translation().ttl_seconds),
            ("geocoding.timeout_seconds", self.geocoding().timeout_seconds),
        ] {
            if value == Some(0) {
                return Err(OfferError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: "0".to_string(),
                    reason: "must be at least 1 second".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn snapshot_path(&self) -> &str {
        self.directory
            .as_ref()
            .and_then(|d| d.snapshot.as_deref())
            .unwrap_or("offers.json")
    }

    fn localities_csv_path(&self) -> Option<&str> {
        self.directory
            .as_ref()
            .and_then(|d| d.localities_csv.as_deref())
    }

    fn translate_endpoint(&self) -> &str {
        self.translation
            .as_ref()
            .and_then(|t| t.endpoint.as_deref())
            .unwrap_or(DEFAULT_TRANSLATE_ENDPOINT)
    }

    fn translate_timeout(&self) -> Duration {
        Duration::from_secs(self.translation().timeout_seconds.unwrap_or(5))
    }

    fn translation_ttl(&self) -> Duration {
        Duration::from_secs(self.translation().ttl_seconds.unwrap_or(86_400))
    }

    fn cache_capacity(&self) -> usize {
        self.translation().cache_capacity.unwrap_or(10_000)
    }

    fn max_text_length(&self) -> usize {
        self.translation().max_text_length.unwrap_or(500)
    }

    fn base64_min_length(&self) -> usize {
        self.translation().base64_min_length.unwrap_or(64)
    }

    fn opaque_prefixes(&self) -> Vec<String> {
        self.translation().opaque_prefixes.unwrap_or_else(|| {
            vec![
                "media/".to_string(),
                "/media/".to_string(),
                "uploads/".to_string(),
            ]
        })
    }

    fn geocode_endpoint(&self) -> &str {
        self.geocoding
            .as_ref()
            .and_then(|g| g.endpoint.as_deref())
            .unwrap_or(DEFAULT_GEOCODE_ENDPOINT)
    }

    fn geocode_region(&self) -> &str {
        self.geocoding
            .as_ref()
            .and_then(|g| g.region.as_deref())
            .unwrap_or("Tamil Nadu, India")
    }

    fn geocode_country_codes(&self) -> &str {
        self.geocoding
            .as_ref()
            .and_then(|g| g.country_codes.as_deref())
            .unwrap_or("in")
    }

    fn user_agent(&self) -> &str {
        self.service
            .as_ref()
            .and_then(|s| s.user_agent.as_deref())
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    fn geocode_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoding().timeout_seconds.unwrap_or(3))
    }

    fn geo_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.geocoding().cache_ttl_seconds.unwrap_or(86_400))
    }

    fn fallback_radius_km(&self) -> f64 {
        self.search
            .as_ref()
            .and_then(|s| s.fallback_radius_km)
            .unwrap_or(DEFAULT_FALLBACK_RADIUS_KM)
    }

    fn max_offers(&self) -> usize {
        self.search
            .as_ref()
            .and_then(|s| s.max_offers)
            .unwrap_or(DEFAULT_MAX_OFFERS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
