use crate::utils::error::{OfferError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_ID_LENGTH: usize = 64;

/// Directory identifier: 1-64 ASCII alphanumerics, `-` or `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let valid = !value.is_empty()
            && value.len() <= MAX_ID_LENGTH
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(value.to_string()))
        } else {
            Err(OfferError::InvalidIdentifier {
                value: value.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityId {
    type Error = OfferError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Source of truth for all stored content.
    En,
    /// Presentation language.
    Ta,
}

impl Language {
    /// `ta` in any case selects Tamil; anything else falls back to English.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(code) if code.eq_ignore_ascii_case("ta") => Language::Ta,
            _ => Language::En,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ta => "ta",
        }
    }

    pub fn is_display(&self) -> bool {
        matches!(self, Language::Ta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// English to Tamil, for responses.
    ToDisplay,
    /// Tamil to English, for queries and stored content.
    ToSource,
}

impl Direction {
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Direction::ToDisplay => "en_ta:",
            Direction::ToSource => "ta_en:",
        }
    }

    pub fn source(&self) -> Language {
        match self {
            Direction::ToDisplay => Language::En,
            Direction::ToSource => Language::Ta,
        }
    }

    pub fn target(&self) -> Language {
        match self {
            Direction::ToDisplay => Language::Ta,
            Direction::ToSource => Language::En,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(OfferError::DirectoryRecordError {
                record: "coordinates".to_string(),
                message: format!("({}, {}) is outside the valid range", lat, lng),
            });
        }
        Ok(Self { lat, lng })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Locality {
    pub id: EntityId,
    pub name: String,
    pub district: Option<String>,
    pub state: Option<String>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Venue {
    pub id: EntityId,
    pub locality_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub phone: Option<String>,
    pub status: VenueStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionStatus {
    Pending,
    Approved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaRef {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub path: String,
    pub mime_type: &'static str,
}

impl MediaRef {
    /// Infers kind and mime type from the filename extension; unknown extensions are PNG images.
    pub fn from_filename(path: String, filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        let (kind, mime_type) = if lower.ends_with(".mp4") {
            (MediaKind::Video, "video/mp4")
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            (MediaKind::Image, "image/jpeg")
        } else {
            (MediaKind::Image, "image/png")
        };
        Self {
            kind,
            path,
            mime_type,
        }
    }

    /// An explicit kind from the record wins over the extension.
    pub fn with_kind(path: String, kind: MediaKind, filename: &str) -> Self {
        let inferred = Self::from_filename(path, filename);
        if inferred.kind == kind {
            return inferred;
        }
        let mime_type = match kind {
            MediaKind::Video => "video/mp4",
            MediaKind::Image => "image/png",
        };
        Self {
            kind,
            mime_type,
            ..inferred
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Promotion {
    pub id: EntityId,
    pub venue_id: EntityId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub percentage: Option<f64>,
    pub fee: Option<f64>,
    pub media: Option<MediaRef>,
    pub filename: Option<String>,
    pub status: PromotionStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Promotion {
    pub fn is_approved(&self) -> bool {
        self.status == PromotionStatus::Approved
    }

    /// Advisory only: lookups never filter on the validity window.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| start <= date)
            && self.end_date.map_or(true, |end| date <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_parse() {
        assert!(EntityId::parse("65f1c2a9e4b0a1b2c3d4e5f6").is_ok());
        assert!(EntityId::parse("shop_1-a").is_ok());
        assert_eq!(EntityId::parse("  city-1 ").unwrap().as_str(), "city-1");
        assert!(EntityId::parse("").is_err());
        assert!(EntityId::parse("../etc/passwd").is_err());
        assert!(EntityId::parse("has space").is_err());
        assert!(EntityId::parse(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_language_from_param() {
        assert_eq!(Language::from_param(Some("ta")), Language::Ta);
        assert_eq!(Language::from_param(Some("TA")), Language::Ta);
        assert_eq!(Language::from_param(Some("en")), Language::En);
        assert_eq!(Language::from_param(Some("fr")), Language::En);
        assert_eq!(Language::from_param(None), Language::En);
    }

    #[test]
    fn test_direction_languages() {
        assert_eq!(Direction::ToDisplay.source(), Language::En);
        assert_eq!(Direction::ToDisplay.target(), Language::Ta);
        assert_eq!(Direction::ToSource.source(), Language::Ta);
        assert_eq!(Direction::ToSource.target(), Language::En);
        assert_ne!(Direction::ToDisplay.key_prefix(), Direction::ToSource.key_prefix());
    }

    #[test]
    fn test_coordinates_range() {
        assert!(Coordinates::new(9.9252, 78.1198).is_ok());
        assert!(Coordinates::new(91.0, 78.0).is_err());
        assert!(Coordinates::new(9.0, -181.0).is_err());
        assert!(Coordinates::new(f64::NAN, 78.0).is_err());
    }

    #[test]
    fn test_media_inferred_from_filename() {
        let video = MediaRef::from_filename("media/a.mp4".to_string(), "Promo.MP4");
        assert_eq!(video.kind, MediaKind::Video);
        assert_eq!(video.mime_type, "video/mp4");

        let jpeg = MediaRef::from_filename("media/b.jpeg".to_string(), "b.jpeg");
        assert_eq!(jpeg.kind, MediaKind::Image);
        assert_eq!(jpeg.mime_type, "image/jpeg");

        let other = MediaRef::from_filename("media/c.webp".to_string(), "c.webp");
        assert_eq!(other.kind, MediaKind::Image);
        assert_eq!(other.mime_type, "image/png");
    }

    #[test]
    fn test_validity_window_is_inclusive() {
        let promotion = Promotion {
            id: EntityId::parse("o1").unwrap(),
            venue_id: EntityId::parse("s1").unwrap(),
            title: None,
            description: None,
            percentage: None,
            fee: None,
            media: None,
            filename: None,
            status: PromotionStatus::Approved,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 31),
        };
        assert!(promotion.is_active_on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(promotion.is_active_on(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()));
        assert!(!promotion.is_active_on(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
    }
}
