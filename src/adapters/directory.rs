//! Read-only locality/venue/promotion directory held in memory.
//!
//! Loaded from a JSON snapshot exported by the main database, optionally topped up with a
//! localities CSV. Loosely shaped records are validated here so the core only sees typed
//! entities; records that fail validation are skipped and counted.

use crate::domain::model::{
    Coordinates, EntityId, Locality, MediaKind, MediaRef, Promotion, PromotionStatus, Venue,
    VenueStatus,
};
use crate::domain::ports::{LocalityDirectory, Storage, VenueDirectory};
use crate::utils::error::{OfferError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// Top-level snapshot document. Records stay untyped until validation so one bad record
/// cannot reject the whole file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectorySnapshot {
    #[serde(default, alias = "cities")]
    pub localities: Vec<Value>,
    #[serde(default, alias = "shops")]
    pub venues: Vec<Value>,
    #[serde(default, alias = "offers")]
    pub promotions: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLocality {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "city_name")]
    pub name: String,
    pub district: Option<String>,
    pub state: Option<String>,
    #[serde(alias = "latitude")]
    pub lat: Option<Value>,
    #[serde(alias = "longitude", alias = "lon")]
    pub lng: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawVenue {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "city_id")]
    pub locality_id: String,
    #[serde(alias = "shop_name")]
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPromotion {
    #[serde(alias = "offer_id")]
    pub id: String,
    #[serde(alias = "shop_id")]
    pub venue_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub percentage: Option<Value>,
    pub fee: Option<Value>,
    pub media_type: Option<String>,
    pub media_path: Option<String>,
    pub filename: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CsvLocality {
    id: String,
    name: String,
    district: Option<String>,
    state: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub localities: usize,
    pub venues: usize,
    pub promotions: usize,
    pub skipped: usize,
}

fn record_error(record: &str, message: impl Into<String>) -> OfferError {
    OfferError::DirectoryRecordError {
        record: record.to_string(),
        message: message.into(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn loose_number(record: &str, field: &str, value: Option<&Value>) -> Result<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .trim_end_matches('%')
            .parse()
            .map(Some)
            .map_err(|_| record_error(record, format!("{} {:?} is not a number", field, s))),
        Some(other) => Err(record_error(record, format!("{} {} is not a number", field, other))),
    }
}

fn parse_date(record: &str, value: Option<String>) -> Result<Option<NaiveDate>> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&value, "%d-%m-%Y"))
        .map(Some)
        .map_err(|_| record_error(record, format!("unrecognised date {:?}", value)))
}

fn build_locality(
    id: &str,
    name: &str,
    district: Option<String>,
    state: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<Locality> {
    let id = EntityId::parse(id)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(record_error("locality", format!("{} has no name", id)));
    }
    let coordinates = match (lat, lng) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)?),
        (None, None) => None,
        _ => {
            return Err(record_error(
                "locality",
                format!("{} has only one of lat/lng", id),
            ))
        }
    };
    Ok(Locality {
        id,
        name: name.to_string(),
        district: non_blank(district),
        state: non_blank(state),
        coordinates,
    })
}

impl TryFrom<RawLocality> for Locality {
    type Error = OfferError;

    fn try_from(raw: RawLocality) -> Result<Self> {
        let lat = loose_number("locality", "lat", raw.lat.as_ref())?;
        let lng = loose_number("locality", "lng", raw.lng.as_ref())?;
        build_locality(&raw.id, &raw.name, raw.district, raw.state, lat, lng)
    }
}

impl TryFrom<RawVenue> for Venue {
    type Error = OfferError;

    fn try_from(raw: RawVenue) -> Result<Self> {
        let id = EntityId::parse(&raw.id)?;
        let name = raw.name.trim().to_string();
        if name.is_empty() {
            return Err(record_error("venue", format!("{} has no name", id)));
        }
        let status = match non_blank(raw.status).map(|s| s.to_ascii_lowercase()).as_deref() {
            None | Some("pending") => VenueStatus::Pending,
            Some("approved") => VenueStatus::Approved,
            Some("rejected") => VenueStatus::Rejected,
            Some(other) => {
                return Err(record_error("venue", format!("{} has unknown status {:?}", id, other)))
            }
        };
        Ok(Venue {
            locality_id: EntityId::parse(&raw.locality_id)?,
            id,
            name,
            description: non_blank(raw.description),
            address: non_blank(raw.address),
            category: non_blank(raw.category),
            phone: non_blank(raw.phone),
            status,
        })
    }
}

impl TryFrom<RawPromotion> for Promotion {
    type Error = OfferError;

    fn try_from(raw: RawPromotion) -> Result<Self> {
        let id = EntityId::parse(&raw.id)?;
        let status = match non_blank(raw.status).map(|s| s.to_ascii_lowercase()).as_deref() {
            None | Some("pending") => PromotionStatus::Pending,
            Some("approved") => PromotionStatus::Approved,
            Some(other) => {
                return Err(record_error(
                    "promotion",
                    format!("{} has unknown status {:?}", id, other),
                ))
            }
        };

        let filename = non_blank(raw.filename);
        let media = match non_blank(raw.media_path) {
            None => None,
            Some(path) => {
                let name = filename.clone().unwrap_or_else(|| path.clone());
                let kind = match non_blank(raw.media_type).map(|t| t.to_ascii_lowercase()).as_deref() {
                    None => None,
                    Some("image") => Some(MediaKind::Image),
                    Some("video") => Some(MediaKind::Video),
                    Some(other) => {
                        return Err(record_error(
                            "promotion",
                            format!("{} has unknown media type {:?}", id, other),
                        ))
                    }
                };
                Some(match kind {
                    Some(kind) => MediaRef::with_kind(path, kind, &name),
                    None => MediaRef::from_filename(path, &name),
                })
            }
        };

        Ok(Promotion {
            venue_id: EntityId::parse(&raw.venue_id)?,
            title: non_blank(raw.title),
            description: non_blank(raw.description),
            percentage: loose_number("promotion", "percentage", raw.percentage.as_ref())?,
            fee: loose_number("promotion", "fee", raw.fee.as_ref())?,
            media,
            filename,
            status,
            start_date: parse_date("promotion", raw.start_date)?,
            end_date: parse_date("promotion", raw.end_date)?,
            id,
        })
    }
}

/// Converts raw records, dropping invalid ones and repeated ids (first one wins).
fn validate_all<R, E, F>(raws: Vec<Value>, kind: &str, id_of: F, skipped: &mut usize) -> Vec<E>
where
    R: DeserializeOwned,
    E: TryFrom<R, Error = OfferError>,
    F: Fn(&E) -> &EntityId,
{
    let mut seen = HashSet::new();
    let mut entities = Vec::with_capacity(raws.len());
    for raw in raws {
        let parsed = serde_json::from_value::<R>(raw)
            .map_err(OfferError::from)
            .and_then(E::try_from);
        match parsed {
            Ok(entity) if seen.insert(id_of(&entity).clone()) => entities.push(entity),
            Ok(entity) => {
                tracing::warn!("Skipping duplicate {} {}", kind, id_of(&entity));
                *skipped += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", kind, e);
                *skipped += 1;
            }
        }
    }
    entities
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    localities: Vec<Locality>,
    venues: Vec<Venue>,
    promotions: Vec<Promotion>,
}

impl InMemoryDirectory {
    pub fn new(localities: Vec<Locality>, venues: Vec<Venue>, promotions: Vec<Promotion>) -> Self {
        Self {
            localities,
            venues,
            promotions,
        }
    }

    pub fn from_snapshot(snapshot: DirectorySnapshot) -> (Self, LoadReport) {
        let mut skipped = 0;
        let localities = validate_all::<RawLocality, _, _>(
            snapshot.localities,
            "locality",
            |l: &Locality| &l.id,
            &mut skipped,
        );
        let venues =
            validate_all::<RawVenue, _, _>(snapshot.venues, "venue", |v: &Venue| &v.id, &mut skipped);
        let promotions = validate_all::<RawPromotion, _, _>(
            snapshot.promotions,
            "promotion",
            |p: &Promotion| &p.id,
            &mut skipped,
        );

        let report = LoadReport {
            localities: localities.len(),
            venues: venues.len(),
            promotions: promotions.len(),
            skipped,
        };
        (Self::new(localities, venues, promotions), report)
    }

    pub fn from_json(data: &[u8]) -> Result<(Self, LoadReport)> {
        let snapshot: DirectorySnapshot = serde_json::from_slice(data)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Adds CSV localities (`id,name,district,state,lat,lng`). Rows for known ids only fill in
    /// missing coordinates; everything else about an existing locality is kept.
    pub fn merge_localities_csv(&mut self, data: &[u8]) -> Result<LoadReport> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data);
        let mut report = LoadReport::default();

        for row in reader.deserialize::<CsvLocality>() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Skipping CSV row: {}", e);
                    report.skipped += 1;
                    continue;
                }
            };
            let locality = match build_locality(&row.id, &row.name, row.district, row.state, row.lat, row.lng) {
                Ok(locality) => locality,
                Err(e) => {
                    tracing::warn!("Skipping CSV locality: {}", e);
                    report.skipped += 1;
                    continue;
                }
            };

            match self.localities.iter_mut().find(|l| l.id == locality.id) {
                Some(existing) if existing.coordinates.is_none() && locality.coordinates.is_some() => {
                    existing.coordinates = locality.coordinates;
                    report.localities += 1;
                }
                Some(_) => report.skipped += 1,
                None => {
                    self.localities.push(locality);
                    report.localities += 1;
                }
            }
        }
        Ok(report)
    }

    pub async fn load<S: Storage>(
        storage: &S,
        snapshot_path: &str,
        localities_csv_path: Option<&str>,
    ) -> Result<(Self, LoadReport)> {
        let data = storage.read_file(snapshot_path).await?;
        let (mut directory, mut report) = Self::from_json(&data)?;

        if let Some(csv_path) = localities_csv_path {
            let csv_data = storage.read_file(csv_path).await?;
            let csv_report = directory.merge_localities_csv(&csv_data)?;
            report.localities = directory.localities.len();
            report.skipped += csv_report.skipped;
        }

        tracing::info!(
            "Directory loaded: {} localities, {} venues, {} promotions ({} skipped)",
            report.localities,
            report.venues,
            report.promotions,
            report.skipped
        );
        Ok((directory, report))
    }
}

#[async_trait]
impl LocalityDirectory for InMemoryDirectory {
    async fn find_by_name(&self, name: &str) -> Result<Vec<Locality>> {
        let needle = name.trim().to_lowercase();
        Ok(self
            .localities
            .iter()
            .filter(|l| l.name.to_lowercase() == needle)
            .cloned()
            .collect())
    }

    async fn find_by_name_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<Locality>> {
        let needle = prefix.trim().to_lowercase();
        Ok(self
            .localities
            .iter()
            .filter(|l| l.name.to_lowercase().starts_with(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<Locality>> {
        Ok(self.localities.iter().find(|l| &l.id == id).cloned())
    }

    async fn find_all_with_coordinates(&self) -> Result<Vec<Locality>> {
        Ok(self
            .localities
            .iter()
            .filter(|l| l.coordinates.is_some())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VenueDirectory for InMemoryDirectory {
    async fn find_venues_by_locality(&self, locality_id: &EntityId) -> Result<Vec<Venue>> {
        Ok(self
            .venues
            .iter()
            .filter(|v| &v.locality_id == locality_id)
            .cloned()
            .collect())
    }

    async fn find_venue(&self, id: &EntityId) -> Result<Option<Venue>> {
        Ok(self.venues.iter().find(|v| &v.id == id).cloned())
    }

    async fn find_promotions_by_venue(&self, venue_id: &EntityId) -> Result<Vec<Promotion>> {
        Ok(self
            .promotions
            .iter()
            .filter(|p| &p.venue_id == venue_id)
            .cloned()
            .collect())
    }

    async fn find_promotion(&self, id: &EntityId) -> Result<Option<Promotion>> {
        Ok(self.promotions.iter().find(|p| &p.id == id).cloned())
    }
}
