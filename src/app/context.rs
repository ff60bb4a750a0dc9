use crate::adapters::{GoogleTranslator, InMemoryDirectory, LoadReport, NominatimGeocoder};
use crate::core::cache::{SystemClock, TtlCache};
use crate::core::catalog::OfferCatalog;
use crate::core::gate::{GateConfig, TranslationGate};
use crate::core::geo::GeoResolver;
use crate::core::offers::{OfferFallbackEngine, SearchConfig};
use crate::core::translation::{Localizer, TranslationCache};
use crate::domain::model::Coordinates;
use crate::domain::ports::{
    Clock, ConfigProvider, Geocoder, LocalityDirectory, Storage, Translator, VenueDirectory,
};
use crate::utils::error::Result;
use std::sync::Arc;

/// Geocoder answers are cached in the same bounded way as translations.
const GEO_CACHE_CAPACITY: usize = 10_000;

/// Everything a request needs, built once per process and shared by all requests.
///
/// The two caches live here and nowhere else; every engine and catalog built from this context
/// reads and writes the same instances.
pub struct AppContext<D = InMemoryDirectory, G = NominatimGeocoder, T = GoogleTranslator>
where
    D: LocalityDirectory + VenueDirectory,
    G: Geocoder,
    T: Translator,
{
    pub engine: OfferFallbackEngine<D, G, T>,
    pub catalog: OfferCatalog<D, T>,
    translations: Arc<TranslationCache>,
    coordinates: Arc<TtlCache<Coordinates>>,
    load_report: Option<LoadReport>,
}

impl<D, G, T> AppContext<D, G, T>
where
    D: LocalityDirectory + VenueDirectory,
    G: Geocoder,
    T: Translator,
{
    pub fn from_parts<C: ConfigProvider + ?Sized>(
        config: &C,
        directory: D,
        geocoder: G,
        translator: T,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let gate = TranslationGate::new(GateConfig {
            max_text_length: config.max_text_length(),
            base64_min_length: config.base64_min_length(),
            opaque_prefixes: config.opaque_prefixes(),
        });
        let translations = Arc::new(TranslationCache::new(
            gate,
            config.translation_ttl(),
            config.cache_capacity(),
            clock.clone(),
        ));
        let coordinates = Arc::new(TtlCache::new(
            config.geo_cache_ttl(),
            GEO_CACHE_CAPACITY,
            clock,
        ));

        let directory = Arc::new(directory);
        let localizer = Arc::new(Localizer::new(translator, translations.clone()));
        let resolver = GeoResolver::new(
            directory.clone(),
            geocoder,
            coordinates.clone(),
            config.geocode_timeout(),
        );
        let search = SearchConfig {
            fallback_radius_km: config.fallback_radius_km(),
            max_offers: config.max_offers(),
        };

        Self {
            engine: OfferFallbackEngine::new(directory.clone(), resolver, localizer.clone(), search),
            catalog: OfferCatalog::new(directory, localizer),
            translations,
            coordinates,
            load_report: None,
        }
    }

    pub fn cached_translations(&self) -> usize {
        self.translations.cached_entries()
    }

    pub fn cached_coordinates(&self) -> usize {
        self.coordinates.len()
    }

    /// Present when the directory was loaded from storage.
    pub fn load_report(&self) -> Option<LoadReport> {
        self.load_report
    }
}

impl AppContext {
    /// Loads the directory through `storage` and wires the HTTP translator and geocoder.
    pub async fn load<C, S>(config: &C, storage: &S) -> Result<Self>
    where
        C: ConfigProvider + ?Sized,
        S: Storage,
    {
        let (directory, report) =
            InMemoryDirectory::load(storage, config.snapshot_path(), config.localities_csv_path())
                .await?;
        let translator = GoogleTranslator::new(config.translate_endpoint(), config.translate_timeout())?;
        let geocoder = NominatimGeocoder::new(
            config.geocode_endpoint(),
            config.geocode_region(),
            config.geocode_country_codes(),
            config.user_agent(),
            config.geocode_timeout(),
        )?;

        let mut context = Self::from_parts(config, directory, geocoder, translator, Arc::new(SystemClock));
        context.load_report = Some(report);
        Ok(context)
    }
}
