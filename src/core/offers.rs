//! Offer lookup for a city with nearest-locality fallback.
//!
//! A city with approved offers answers directly. Otherwise the request is anchored to a reference
//! point (the city's own coordinates, or a geocoded guess) and the closest locality inside the
//! fallback radius that has approved offers answers instead. Every collaborator failure degrades
//! to an empty, successful lookup.

use crate::core::geo::{haversine_km, round_to_tenth, GeoResolver};
use crate::core::translation::Localizer;
use crate::domain::model::{
    Coordinates, EntityId, Language, Locality, MediaRef, Promotion, Venue,
};
use crate::domain::ports::{Geocoder, LocalityDirectory, Translator, VenueDirectory};
use crate::utils::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_FALLBACK_RADIUS_KM: f64 = 25.0;
pub const DEFAULT_MAX_OFFERS: usize = 3;
pub const NO_OFFERS_MESSAGE: &str = "No offers found";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub fallback_radius_km: f64,
    pub max_offers: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fallback_radius_km: DEFAULT_FALLBACK_RADIUS_KM,
            max_offers: DEFAULT_MAX_OFFERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferSlide {
    pub offer_id: EntityId,
    pub venue_id: EntityId,
    pub venue: Venue,
    pub title: Option<String>,
    pub description: Option<String>,
    pub percentage: Option<f64>,
    pub fee: Option<f64>,
    pub media: Option<MediaRef>,
    pub filename: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl OfferSlide {
    pub fn new(venue: Venue, promotion: Promotion) -> Self {
        Self {
            offer_id: promotion.id,
            venue_id: venue.id.clone(),
            venue,
            title: promotion.title,
            description: promotion.description,
            percentage: promotion.percentage,
            fee: promotion.fee,
            media: promotion.media,
            filename: promotion.filename,
            start_date: promotion.start_date,
            end_date: promotion.end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalityPayload {
    #[serde(flatten)]
    pub locality: Locality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferLookup {
    pub offers: Vec<OfferSlide>,
    pub locality: Option<LocalityPayload>,
    pub is_nearby_result: bool,
    pub distance_km: Option<f64>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub locality: Locality,
    pub distance_km: f64,
}

/// Distance from `reference` to every locality with coordinates, nearest first.
///
/// The sort is stable, so localities at equal distance keep the order the directory returned them
/// in. No secondary key is applied.
pub fn rank_by_distance(reference: Coordinates, localities: Vec<Locality>) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = localities
        .into_iter()
        .filter_map(|locality| {
            let coordinates = locality.coordinates?;
            Some(Candidate {
                distance_km: haversine_km(reference, coordinates),
                locality,
            })
        })
        .collect();
    candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    candidates
}

/// Prefix of a ranked list inside the radius; a candidate at exactly `radius_km` is included.
pub fn within_radius(candidates: &[Candidate], radius_km: f64) -> &[Candidate] {
    let end = candidates
        .iter()
        .position(|c| c.distance_km > radius_km)
        .unwrap_or(candidates.len());
    &candidates[..end]
}

pub struct OfferFallbackEngine<D, G, T>
where
    D: LocalityDirectory + VenueDirectory,
    G: Geocoder,
    T: Translator,
{
    directory: Arc<D>,
    resolver: GeoResolver<D, G>,
    localizer: Arc<Localizer<T>>,
    config: SearchConfig,
}

impl<D, G, T> OfferFallbackEngine<D, G, T>
where
    D: LocalityDirectory + VenueDirectory,
    G: Geocoder,
    T: Translator,
{
    pub fn new(
        directory: Arc<D>,
        resolver: GeoResolver<D, G>,
        localizer: Arc<Localizer<T>>,
        config: SearchConfig,
    ) -> Self {
        Self {
            directory,
            resolver,
            localizer,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub async fn get_offers(&self, city_query: &str, lang: Language) -> OfferLookup {
        let query = if lang.is_display() {
            self.localizer.to_source(city_query).await
        } else {
            city_query.to_string()
        };
        let query = query.trim();
        tracing::debug!("Looking up offers for {:?} (lang={})", query, lang.code());

        let matches = or_empty(
            self.directory.find_by_name(query).await,
            "locality lookup",
        );

        for locality in &matches {
            let offers = self.approved_offers(locality).await;
            if !offers.is_empty() {
                tracing::info!("{} offers found in {}", offers.len(), locality.name);
                return self
                    .found(locality.clone(), offers, None, lang)
                    .await;
            }
        }

        let reference = match matches.iter().find_map(|l| l.coordinates) {
            Some(coordinates) => Some(coordinates),
            None => self.resolver.resolve_unlisted(query).await,
        };
        let Some(reference) = reference else {
            tracing::info!("No reference point for {:?}, nothing nearby to offer", query);
            return self.empty(lang).await;
        };

        let localities = or_empty(
            self.directory.find_all_with_coordinates().await,
            "coordinate scan",
        );
        let ranked = rank_by_distance(reference, localities);

        for candidate in within_radius(&ranked, self.config.fallback_radius_km) {
            let offers = self.approved_offers(&candidate.locality).await;
            if !offers.is_empty() {
                let distance_km = round_to_tenth(candidate.distance_km);
                tracing::info!(
                    "Nearest offers for {:?} are in {} ({} km)",
                    query,
                    candidate.locality.name,
                    distance_km
                );
                return self
                    .found(candidate.locality.clone(), offers, Some(distance_km), lang)
                    .await;
            }
        }

        tracing::info!(
            "No offers within {} km of {:?}",
            self.config.fallback_radius_km,
            query
        );
        self.empty(lang).await
    }

    /// Approved offers across the locality's venues, capped at `max_offers`.
    async fn approved_offers(&self, locality: &Locality) -> Vec<(Venue, Promotion)> {
        let venues = or_empty(
            self.directory.find_venues_by_locality(&locality.id).await,
            "venue lookup",
        );

        let mut offers = Vec::new();
        for venue in venues {
            if offers.len() >= self.config.max_offers {
                break;
            }
            let promotions = or_empty(
                self.directory.find_promotions_by_venue(&venue.id).await,
                "promotion lookup",
            );
            for promotion in promotions.into_iter().filter(Promotion::is_approved) {
                if offers.len() >= self.config.max_offers {
                    break;
                }
                offers.push((venue.clone(), promotion));
            }
        }
        offers
    }

    async fn found(
        &self,
        locality: Locality,
        offers: Vec<(Venue, Promotion)>,
        distance_km: Option<f64>,
        lang: Language,
    ) -> OfferLookup {
        let mut slides = Vec::with_capacity(offers.len());
        for (venue, promotion) in offers {
            let venue = if lang.is_display() {
                self.localizer.venue_to_display(venue).await
            } else {
                venue
            };
            slides.push(OfferSlide::new(venue, promotion));
        }

        let locality = if lang.is_display() {
            self.localizer.locality_to_display(locality).await
        } else {
            locality
        };

        OfferLookup {
            offers: slides,
            locality: Some(LocalityPayload {
                locality,
                distance_km,
            }),
            is_nearby_result: distance_km.is_some(),
            distance_km,
            message: None,
        }
    }

    async fn empty(&self, lang: Language) -> OfferLookup {
        let message = if lang.is_display() {
            self.localizer.to_display(NO_OFFERS_MESSAGE).await
        } else {
            NO_OFFERS_MESSAGE.to_string()
        };
        OfferLookup {
            message: Some(message),
            ..OfferLookup::default()
        }
    }
}

pub(crate) fn or_empty<T: Default>(result: Result<T>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!("Directory {} failed, continuing without it: {}", what, e);
        T::default()
    })
}
