use crate::domain::model::{Coordinates, EntityId, Language, Locality, Promotion, Venue};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn snapshot_path(&self) -> &str;
    fn localities_csv_path(&self) -> Option<&str>;

    fn translate_endpoint(&self) -> &str;
    fn translate_timeout(&self) -> Duration;
    fn translation_ttl(&self) -> Duration;
    fn cache_capacity(&self) -> usize;
    fn max_text_length(&self) -> usize;
    fn base64_min_length(&self) -> usize;
    fn opaque_prefixes(&self) -> Vec<String>;

    fn geocode_endpoint(&self) -> &str;
    fn geocode_region(&self) -> &str;
    fn geocode_country_codes(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn geocode_timeout(&self) -> Duration;
    fn geo_cache_ttl(&self) -> Duration;

    fn fallback_radius_km(&self) -> f64;
    fn max_offers(&self) -> usize;
}

/// Machine translation between the source and display languages.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String>;
}

/// Place-name search restricted to the operating region.
///
/// `Ok(None)` means the service answered but knew no such place.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, name: &str) -> Result<Option<Coordinates>>;
}

#[async_trait]
pub trait LocalityDirectory: Send + Sync {
    /// Case-insensitive exact name match.
    async fn find_by_name(&self, name: &str) -> Result<Vec<Locality>>;
    /// Case-insensitive prefix match.
    async fn find_by_name_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<Locality>>;
    async fn find_by_id(&self, id: &EntityId) -> Result<Option<Locality>>;
    async fn find_all_with_coordinates(&self) -> Result<Vec<Locality>>;
}

#[async_trait]
pub trait VenueDirectory: Send + Sync {
    async fn find_venues_by_locality(&self, locality_id: &EntityId) -> Result<Vec<Venue>>;
    async fn find_venue(&self, id: &EntityId) -> Result<Option<Venue>>;
    async fn find_promotions_by_venue(&self, venue_id: &EntityId) -> Result<Vec<Promotion>>;
    async fn find_promotion(&self, id: &EntityId) -> Result<Option<Promotion>>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
