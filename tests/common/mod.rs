#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use nearby_offers::core::cache::ManualClock;
use nearby_offers::domain::model::{
    Coordinates, EntityId, Language, Locality, Promotion, Venue,
};
use nearby_offers::domain::ports::{Geocoder, LocalityDirectory, Translator, VenueDirectory};
use nearby_offers::{AppContext, InMemoryDirectory, OfferError, Result, TomlConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const DINDIGUL: Coordinates = Coordinates {
    lat: 10.3624,
    lng: 77.9695,
};

/// 12.3 km due north of Dindigul.
pub const UNKNOWNVILLE: Coordinates = Coordinates {
    lat: 10.4730,
    lng: 77.9695,
};

/// Madurai (2 approved offers, 1 pending), Dindigul (1 approved offer) and three empty
/// localities north of Dindigul at 24.8 km, 25.008 km and 30.02 km.
pub fn fixture_snapshot() -> serde_json::Value {
    serde_json::json!({
        "localities": [
            {"id": "c-madurai", "name": "Madurai", "district": "Madurai", "state": "Tamil Nadu",
             "lat": 9.9252, "lng": 78.1198},
            {"id": "c-dindigul", "name": "Dindigul", "district": "Dindigul", "state": "Tamil Nadu",
             "lat": 10.3624, "lng": 77.9695},
            {"id": "c-inside", "name": "Ayyalur", "lat": 10.5854, "lng": 77.9695},
            {"id": "c-outside", "name": "Vadamadurai", "lat": 10.5873, "lng": 77.9695},
            {"id": "c-natham", "name": "Natham", "lat": 10.6324, "lng": 77.9695},
            {"id": "c-melur", "name": "Melur"}
        ],
        "venues": [
            {"id": "s-silks", "locality_id": "c-madurai", "name": "Meenakshi Silks",
             "description": "Silk sarees", "category": "Textiles", "phone": "0452-2345678",
             "status": "approved"},
            {"id": "s-sweets", "locality_id": "c-madurai", "name": "Jigarthanda Corner",
             "status": "approved"},
            {"id": "s-locks", "locality_id": "c-dindigul", "name": "Dindigul Locks",
             "address": "Main Road", "status": "approved"},
            {"id": "s-natham", "locality_id": "c-natham", "name": "Natham Stores",
             "status": "approved"}
        ],
        "promotions": [
            {"id": "o-silk-diwali", "venue_id": "s-silks", "title": "Diwali sale", "percentage": 20,
             "media_path": "media/offers/silk.jpg", "filename": "silk.jpg", "status": "approved"},
            {"id": "o-silk-draft", "venue_id": "s-silks", "title": "Draft", "status": "pending"},
            {"id": "o-sweets", "venue_id": "s-sweets", "title": "Buy one get one",
             "media_path": "media/offers/sweets.mp4", "filename": "sweets.mp4", "status": "approved"},
            {"id": "o-locks", "venue_id": "s-locks", "title": "Festival offer", "fee": 150,
             "status": "approved"},
            {"id": "o-natham", "venue_id": "s-natham", "title": "Pending only", "status": "pending"}
        ]
    })
}

/// The fixture with extra approved promotions `(id, venue_id)` appended.
pub fn fixture_directory_with(extra: &[(&str, &str)]) -> InMemoryDirectory {
    let mut snapshot = fixture_snapshot();
    if let Some(promotions) = snapshot["promotions"].as_array_mut() {
        for (id, venue_id) in extra {
            promotions.push(serde_json::json!({
                "id": id, "venue_id": venue_id, "title": id, "status": "approved"
            }));
        }
    }
    let (directory, report) = InMemoryDirectory::from_json(snapshot.to_string().as_bytes()).unwrap();
    assert_eq!(report.skipped, 0);
    directory
}

pub fn fixture_directory() -> InMemoryDirectory {
    let data = fixture_snapshot().to_string();
    let (directory, report) = InMemoryDirectory::from_json(data.as_bytes()).unwrap();
    assert_eq!(report.skipped, 0);
    directory
}

/// Wraps the in-memory directory and counts name lookups and full coordinate scans.
pub struct CountingDirectory {
    inner: InMemoryDirectory,
    pub scans: Arc<AtomicUsize>,
    pub name_lookups: Arc<AtomicUsize>,
    pub fail: bool,
}

impl CountingDirectory {
    pub fn new(inner: InMemoryDirectory) -> Self {
        Self {
            inner,
            scans: Arc::new(AtomicUsize::new(0)),
            name_lookups: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(OfferError::ConfigError {
                message: "directory offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LocalityDirectory for CountingDirectory {
    async fn find_by_name(&self, name: &str) -> Result<Vec<Locality>> {
        self.name_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.find_by_name(name).await
    }

    async fn find_by_name_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<Locality>> {
        self.check()?;
        self.inner.find_by_name_prefix(prefix, limit).await
    }

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<Locality>> {
        self.check()?;
        self.inner.find_by_id(id).await
    }

    async fn find_all_with_coordinates(&self) -> Result<Vec<Locality>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.find_all_with_coordinates().await
    }
}

#[async_trait]
impl VenueDirectory for CountingDirectory {
    async fn find_venues_by_locality(&self, locality_id: &EntityId) -> Result<Vec<Venue>> {
        self.check()?;
        self.inner.find_venues_by_locality(locality_id).await
    }

    async fn find_venue(&self, id: &EntityId) -> Result<Option<Venue>> {
        self.check()?;
        self.inner.find_venue(id).await
    }

    async fn find_promotions_by_venue(&self, venue_id: &EntityId) -> Result<Vec<Promotion>> {
        self.check()?;
        self.inner.find_promotions_by_venue(venue_id).await
    }

    async fn find_promotion(&self, id: &EntityId) -> Result<Option<Promotion>> {
        self.check()?;
        self.inner.find_promotion(id).await
    }
}

/// Geocoder backed by a fixed table, keyed by lowercase name.
pub struct TableGeocoder {
    places: HashMap<String, Coordinates>,
    pub calls: Arc<AtomicUsize>,
}

impl TableGeocoder {
    pub fn new(places: &[(&str, Coordinates)]) -> Self {
        Self {
            places: places
                .iter()
                .map(|(name, coordinates)| (name.to_lowercase(), *coordinates))
                .collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Geocoder for TableGeocoder {
    async fn geocode(&self, name: &str) -> Result<Option<Coordinates>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.places.get(&name.to_lowercase()).copied())
    }
}

/// Tamil to English from a table; English to Tamil by tagging the text with `த:`.
pub struct TableTranslator {
    to_english: HashMap<String, String>,
    fail: bool,
    pub calls: Arc<AtomicUsize>,
}

impl TableTranslator {
    pub fn new(to_english: &[(&str, &str)]) -> Self {
        Self {
            to_english: to_english
                .iter()
                .map(|(ta, en)| (ta.to_string(), en.to_string()))
                .collect(),
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }
}

#[async_trait]
impl Translator for TableTranslator {
    async fn translate(&self, text: &str, _source: Language, target: Language) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(OfferError::TranslationError {
                message: "quota exceeded".to_string(),
            });
        }
        match target {
            Language::En => self
                .to_english
                .get(text.trim())
                .cloned()
                .ok_or_else(|| OfferError::TranslationError {
                    message: format!("no translation for {}", text),
                }),
            Language::Ta => Ok(format!("த:{}", text)),
        }
    }
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap()))
}

pub type TestContext = AppContext<CountingDirectory, TableGeocoder, TableTranslator>;

pub fn context_with(
    directory: CountingDirectory,
    geocoder: TableGeocoder,
    translator: TableTranslator,
) -> TestContext {
    AppContext::from_parts(
        &TomlConfig::default(),
        directory,
        geocoder,
        translator,
        manual_clock(),
    )
}
