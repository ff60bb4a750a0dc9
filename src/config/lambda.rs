#[cfg(feature = "lambda")]
use crate::adapters::google_translate::DEFAULT_TRANSLATE_ENDPOINT;
#[cfg(feature = "lambda")]
use crate::adapters::nominatim::DEFAULT_GEOCODE_ENDPOINT;
#[cfg(feature = "lambda")]
use crate::core::offers::{DEFAULT_FALLBACK_RADIUS_KM, DEFAULT_MAX_OFFERS};
#[cfg(feature = "lambda")]
use crate::core::{ConfigProvider, Storage};
#[cfg(feature = "lambda")]
use crate::utils::error::{OfferError, Result};
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use std::env;
#[cfg(feature = "lambda")]
use std::str::FromStr;
#[cfg(feature = "lambda")]
use std::time::Duration;

/// Configuration from the function's environment. The snapshot lives in S3.
#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub s3_bucket: String,
    pub s3_region: String,
    pub snapshot_key: String,
    pub localities_csv_key: Option<String>,
    pub translate_endpoint: String,
    pub translate_timeout_seconds: u64,
    pub translation_ttl_seconds: u64,
    pub cache_capacity: usize,
    pub geocode_endpoint: String,
    pub geocode_region: String,
    pub geocode_country_codes: String,
    pub user_agent: String,
    pub geocode_timeout_seconds: u64,
    pub fallback_radius_km: f64,
    pub max_offers: usize,
}

#[cfg(feature = "lambda")]
fn env_or<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| OfferError::InvalidConfigValueError {
                field: name.to_string(),
                value,
                reason: "could not be parsed".to_string(),
            }),
        Err(_) => Ok(default),
    }
}

#[cfg(feature = "lambda")]
impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            s3_bucket: env::var("S3_BUCKET").map_err(|_| OfferError::MissingConfigError {
                field: "S3_BUCKET".to_string(),
            })?,
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "ap-south-1".to_string()),
            snapshot_key: env::var("SNAPSHOT_KEY").unwrap_or_else(|_| "offers.json".to_string()),
            localities_csv_key: env::var("LOCALITIES_CSV_KEY").ok(),
            translate_endpoint: env::var("TRANSLATE_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_TRANSLATE_ENDPOINT.to_string()),
            translate_timeout_seconds: env_or("TRANSLATE_TIMEOUT_SECONDS", 5)?,
            translation_ttl_seconds: env_or("TRANSLATION_TTL_SECONDS", 86_400)?,
            cache_capacity: env_or("TRANSLATION_CACHE_CAPACITY", 10_000)?,
            geocode_endpoint: env::var("GEOCODE_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_GEOCODE_ENDPOINT.to_string()),
            geocode_region: env::var("GEOCODE_REGION")
                .unwrap_or_else(|_| "Tamil Nadu, India".to_string()),
            geocode_country_codes: env::var("GEOCODE_COUNTRY_CODES")
                .unwrap_or_else(|_| "in".to_string()),
            user_agent: env::var("GEOCODE_USER_AGENT")
                .unwrap_or_else(|_| concat!("nearby-offers/", env!("CARGO_PKG_VERSION")).to_string()),
            geocode_timeout_seconds: env_or("GEOCODE_TIMEOUT_SECONDS", 3)?,
            fallback_radius_km: env_or("FALLBACK_RADIUS_KM", DEFAULT_FALLBACK_RADIUS_KM)?,
            max_offers: env_or("MAX_OFFERS", DEFAULT_MAX_OFFERS)?,
        })
    }
}

#[cfg(feature = "lambda")]
impl ConfigProvider for LambdaConfig {
    fn snapshot_path(&self) -> &str {
        &self.snapshot_key
    }

    fn localities_csv_path(&self) -> Option<&str> {
        self.localities_csv_key.as_deref()
    }

    fn translate_endpoint(&self) -> &str {
        &self.translate_endpoint
    }

    fn translate_timeout(&self) -> Duration {
        Duration::from_secs(self.translate_timeout_seconds)
    }

    fn translation_ttl(&self) -> Duration {
        Duration::from_secs(self.translation_ttl_seconds)
    }

    fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    fn max_text_length(&self) -> usize {
        500
    }

    fn base64_min_length(&self) -> usize {
        64
    }

    fn opaque_prefixes(&self) -> Vec<String> {
        vec![
            "media/".to_string(),
            "/media/".to_string(),
            "uploads/".to_string(),
        ]
    }

    fn geocode_endpoint(&self) -> &str {
        &self.geocode_endpoint
    }

    fn geocode_region(&self) -> &str {
        &self.geocode_region
    }

    fn geocode_country_codes(&self) -> &str {
        &self.geocode_country_codes
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn geocode_timeout(&self) -> Duration {
        Duration::from_secs(self.geocode_timeout_seconds)
    }

    fn geo_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.translation_ttl_seconds)
    }

    fn fallback_radius_km(&self) -> f64 {
        self.fallback_radius_km
    }

    fn max_offers(&self) -> usize {
        self.max_offers
    }
}

#[cfg(feature = "lambda")]
impl crate::utils::validation::Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_s3_bucket_name("s3_bucket", &self.s3_bucket)?;
        validate_aws_region("s3_region", &self.s3_region)?;
        validate_file_extension("snapshot_key", &self.snapshot_key, &["json"])?;
        if let Some(key) = &self.localities_csv_key {
            validate_file_extension("localities_csv_key", key, &["csv"])?;
        }

        validate_url("translate_endpoint", &self.translate_endpoint)?;
        validate_url("geocode_endpoint", &self.geocode_endpoint)?;
        validate_non_empty_string("user_agent", &self.user_agent)?;

        validate_positive_number("translate_timeout_seconds", self.translate_timeout_seconds as usize, 1)?;
        validate_positive_number("geocode_timeout_seconds", self.geocode_timeout_seconds as usize, 1)?;
        validate_positive_number("cache_capacity", self.cache_capacity, 1)?;
        validate_positive_number("max_offers", self.max_offers, 1)?;
        validate_range("fallback_radius_km", self.fallback_radius_km, 0.0, 500.0)?;

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

#[cfg(feature = "lambda")]
fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(OfferError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name must be between 3 and 63 characters".to_string(),
        });
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(OfferError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots"
                .to_string(),
        });
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(OfferError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name cannot start or end with a hyphen".to_string(),
        });
    }

    Ok(())
}

#[cfg(feature = "lambda")]
fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    crate::utils::validation::validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(OfferError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

/// Read-only access to the directory snapshot in one bucket.
#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

#[cfg(feature = "lambda")]
impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[cfg(feature = "lambda")]
impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| OfferError::ConfigError {
                message: format!("Failed to read s3://{}/{}: {}", self.bucket, path, e),
            })?;

        let data = resp.body.collect().await.map_err(|e| OfferError::ConfigError {
            message: format!("Failed to collect S3 data: {}", e),
        })?;

        Ok(data.into_bytes().to_vec())
    }
}
