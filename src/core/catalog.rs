use crate::core::offers::{or_empty, OfferSlide};
use crate::core::translation::Localizer;
use crate::domain::model::{EntityId, Language, Locality, Venue};
use crate::domain::ports::{LocalityDirectory, Translator, VenueDirectory};
use crate::utils::error::Result;
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferDetails {
    pub main_offer: OfferSlide,
    pub other_offers: Vec<OfferSlide>,
    pub venue: Venue,
    pub locality: Option<Locality>,
}

/// Read-only views over single offers, single venues and locality names.
///
/// Malformed ids are the only errors returned; directory failures read as "nothing found".
pub struct OfferCatalog<D, T>
where
    D: LocalityDirectory + VenueDirectory,
    T: Translator,
{
    directory: Arc<D>,
    localizer: Arc<Localizer<T>>,
}

impl<D, T> OfferCatalog<D, T>
where
    D: LocalityDirectory + VenueDirectory,
    T: Translator,
{
    pub fn new(directory: Arc<D>, localizer: Arc<Localizer<T>>) -> Self {
        Self {
            directory,
            localizer,
        }
    }

    pub async fn get_offer_details(&self, offer_id: &str, lang: Language) -> Result<Option<OfferDetails>> {
        let offer_id = EntityId::parse(offer_id)?;

        let promotion = or_empty(
            self.directory.find_promotion(&offer_id).await,
            "promotion lookup",
        );
        let Some(promotion) = promotion.filter(|p| p.is_approved()) else {
            return Ok(None);
        };
        let venue = or_empty(
            self.directory.find_venue(&promotion.venue_id).await,
            "venue lookup",
        );
        let Some(venue) = venue else {
            tracing::warn!("Offer {} points at missing venue {}", offer_id, promotion.venue_id);
            return Ok(None);
        };
        let venue = self.localize_venue(venue, lang).await;

        let others: Vec<OfferSlide> = or_empty(
            self.directory.find_promotions_by_venue(&venue.id).await,
            "promotion lookup",
        )
        .into_iter()
        .filter(|p| p.is_approved() && p.id != offer_id)
        .map(|p| OfferSlide::new(venue.clone(), p))
        .collect();

        let locality = or_empty(
            self.directory.find_by_id(&venue.locality_id).await,
            "locality lookup",
        );
        let locality = match locality {
            Some(locality) if lang.is_display() => {
                Some(self.localizer.locality_to_display(locality).await)
            }
            other => other,
        };

        Ok(Some(OfferDetails {
            main_offer: OfferSlide::new(venue.clone(), promotion),
            other_offers: others,
            venue,
            locality,
        }))
    }

    /// Approved offers of one venue; an unknown venue has none.
    pub async fn get_venue_offers(&self, venue_id: &str, lang: Language) -> Result<Vec<OfferSlide>> {
        let venue_id = EntityId::parse(venue_id)?;

        let Some(venue) = or_empty(self.directory.find_venue(&venue_id).await, "venue lookup") else {
            return Ok(Vec::new());
        };
        let venue = self.localize_venue(venue, lang).await;

        Ok(or_empty(
            self.directory.find_promotions_by_venue(&venue_id).await,
            "promotion lookup",
        )
        .into_iter()
        .filter(|p| p.is_approved())
        .map(|p| OfferSlide::new(venue.clone(), p))
        .collect())
    }

    pub async fn suggest_localities(&self, prefix: &str, lang: Language, limit: usize) -> Vec<Locality> {
        let prefix = if lang.is_display() {
            self.localizer.to_source(prefix).await
        } else {
            prefix.to_string()
        };
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Vec::new();
        }

        let localities = or_empty(
            self.directory.find_by_name_prefix(prefix, limit).await,
            "locality prefix lookup",
        );
        if !lang.is_display() {
            return localities;
        }

        let mut localized = Vec::with_capacity(localities.len());
        for locality in localities {
            localized.push(self.localizer.locality_to_display(locality).await);
        }
        localized
    }

    async fn localize_venue(&self, venue: Venue, lang: Language) -> Venue {
        if lang.is_display() {
            self.localizer.venue_to_display(venue).await
        } else {
            venue
        }
    }
}
