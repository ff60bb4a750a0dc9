//! Request handling at the service boundary.
//!
//! Every handler answers with a serializable response; input problems become `status: false`
//! bodies and never surface as errors.

use crate::app::context::AppContext;
use crate::core::catalog::DEFAULT_SUGGESTION_LIMIT;
use crate::core::offers::{LocalityPayload, OfferLookup, OfferSlide};
use crate::domain::model::{Language, Locality, Venue};
use crate::domain::ports::{Geocoder, LocalityDirectory, Translator, VenueDirectory};
use crate::utils::error::OfferError;
use serde::Serialize;

pub const CITY_REQUIRED_MESSAGE: &str = "City is required";
pub const OFFER_NOT_FOUND_MESSAGE: &str = "Offer not found";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffersResponse {
    pub status: bool,
    pub slides: Vec<OfferSlide>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_data: Option<LocalityPayload>,
    pub is_nearby_result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<OfferLookup> for OffersResponse {
    fn from(lookup: OfferLookup) -> Self {
        Self {
            status: true,
            count: lookup.offers.len(),
            slides: lookup.offers,
            city_data: lookup.locality,
            is_nearby_result: lookup.is_nearby_result,
            distance_km: lookup.distance_km,
            message: lookup.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferDetailsResponse {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_offer: Option<OfferSlide>,
    pub other_offers: Vec<OfferSlide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop: Option<Venue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<Locality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OfferDetailsResponse {
    fn failed(message: String) -> Self {
        Self {
            status: false,
            main_offer: None,
            other_offers: Vec::new(),
            shop: None,
            city: None,
            message: Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueOffersResponse {
    pub status: bool,
    pub offers: Vec<OfferSlide>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionsResponse {
    pub status: bool,
    pub cities: Vec<Locality>,
}

fn input_error_message(error: &OfferError) -> String {
    if error.is_input_error() {
        tracing::info!("Rejected request: {}", error);
    } else {
        tracing::error!("❌ Request failed: {}", error);
    }
    error.user_friendly_message()
}

/// `GET /offers/{city}?lang=`
pub async fn handle_offers<D, G, T>(
    context: &AppContext<D, G, T>,
    city: &str,
    lang: Option<&str>,
) -> OffersResponse
where
    D: LocalityDirectory + VenueDirectory,
    G: Geocoder,
    T: Translator,
{
    if city.trim().is_empty() {
        return OffersResponse {
            status: false,
            message: Some(CITY_REQUIRED_MESSAGE.to_string()),
            ..OffersResponse::from(OfferLookup::default())
        };
    }
    let lookup = context.engine.get_offers(city, Language::from_param(lang)).await;
    OffersResponse::from(lookup)
}

/// `GET /offers/details/{offer_id}?lang=`
pub async fn handle_offer_details<D, G, T>(
    context: &AppContext<D, G, T>,
    offer_id: &str,
    lang: Option<&str>,
) -> OfferDetailsResponse
where
    D: LocalityDirectory + VenueDirectory,
    G: Geocoder,
    T: Translator,
{
    match context
        .catalog
        .get_offer_details(offer_id, Language::from_param(lang))
        .await
    {
        Ok(Some(details)) => OfferDetailsResponse {
            status: true,
            main_offer: Some(details.main_offer),
            other_offers: details.other_offers,
            shop: Some(details.venue),
            city: details.locality,
            message: None,
        },
        Ok(None) => OfferDetailsResponse::failed(OFFER_NOT_FOUND_MESSAGE.to_string()),
        Err(e) => OfferDetailsResponse::failed(input_error_message(&e)),
    }
}

/// `GET /shops/{venue_id}/offers?lang=`
pub async fn handle_venue_offers<D, G, T>(
    context: &AppContext<D, G, T>,
    venue_id: &str,
    lang: Option<&str>,
) -> VenueOffersResponse
where
    D: LocalityDirectory + VenueDirectory,
    G: Geocoder,
    T: Translator,
{
    match context
        .catalog
        .get_venue_offers(venue_id, Language::from_param(lang))
        .await
    {
        Ok(offers) => VenueOffersResponse {
            status: true,
            count: offers.len(),
            offers,
            message: None,
        },
        Err(e) => VenueOffersResponse {
            status: false,
            offers: Vec::new(),
            count: 0,
            message: Some(input_error_message(&e)),
        },
    }
}

/// `GET /cities/suggest?q=&lang=`
pub async fn handle_suggestions<D, G, T>(
    context: &AppContext<D, G, T>,
    prefix: &str,
    lang: Option<&str>,
) -> SuggestionsResponse
where
    D: LocalityDirectory + VenueDirectory,
    G: Geocoder,
    T: Translator,
{
    let cities = context
        .catalog
        .suggest_localities(prefix, Language::from_param(lang), DEFAULT_SUGGESTION_LIMIT)
        .await;
    SuggestionsResponse {
        status: true,
        cities,
    }
}
