use crate::core::cache::TtlCache;
use crate::core::gate::{is_phonetic_candidate, phonetic_fallback, TranslationGate};
use crate::domain::model::{Direction, Locality, Venue};
use crate::domain::ports::{Clock, Translator};
use crate::utils::error::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Memoizes translations per direction for a fixed time window.
///
/// Failures never escape: a failed or empty translation degrades to the phonetic fallback for
/// short Latin tokens headed for display, and to the original text otherwise.
pub struct TranslationCache {
    gate: TranslationGate,
    entries: TtlCache<String>,
}

impl TranslationCache {
    pub fn new(gate: TranslationGate, ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            gate,
            entries: TtlCache::new(ttl, capacity, clock),
        }
    }

    pub fn gate(&self) -> &TranslationGate {
        &self.gate
    }

    pub fn cache_key(direction: Direction, text: &str) -> String {
        format!("{}{}", direction.key_prefix(), text.trim().to_lowercase())
    }

    pub fn cached_entries(&self) -> usize {
        self.entries.len()
    }

    pub async fn get_or_translate<F, Fut>(&self, direction: Direction, text: &str, translate: F) -> String
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        if !self.gate.allows(direction, text) {
            return text.to_string();
        }

        let key = Self::cache_key(direction, text);
        if let Some(hit) = self.entries.get(&key) {
            tracing::debug!("Translation cache hit for {}", key);
            return hit;
        }

        match translate(text.to_string()).await {
            Ok(translated) if translated.trim().is_empty() => {
                tracing::warn!("Translator returned empty text for {:?}", text);
                degrade(direction, text)
            }
            Ok(translated)
                if direction == Direction::ToDisplay
                    && is_phonetic_candidate(text)
                    && translated.trim().eq_ignore_ascii_case(text.trim()) =>
            {
                tracing::debug!("Translator left {:?} unchanged, using phonetic fallback", text);
                phonetic_fallback(text)
            }
            Ok(translated) => {
                self.entries.insert(key, translated.clone());
                translated
            }
            Err(e) => {
                tracing::warn!("Translation {:?} failed for {:?}: {}", direction, text, e);
                degrade(direction, text)
            }
        }
    }
}

fn degrade(direction: Direction, text: &str) -> String {
    match direction {
        Direction::ToDisplay => phonetic_fallback(text),
        Direction::ToSource => text.to_string(),
    }
}

/// A translator paired with the shared translation cache.
pub struct Localizer<T: Translator> {
    translator: T,
    cache: Arc<TranslationCache>,
}

impl<T: Translator> Localizer<T> {
    pub fn new(translator: T, cache: Arc<TranslationCache>) -> Self {
        Self { translator, cache }
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub async fn translate(&self, direction: Direction, text: &str) -> String {
        let translator = &self.translator;
        self.cache
            .get_or_translate(direction, text, move |source| async move {
                translator
                    .translate(&source, direction.source(), direction.target())
                    .await
            })
            .await
    }

    pub async fn to_display(&self, text: &str) -> String {
        self.translate(Direction::ToDisplay, text).await
    }

    pub async fn to_source(&self, text: &str) -> String {
        self.translate(Direction::ToSource, text).await
    }

    pub async fn to_display_opt(&self, text: Option<String>) -> Option<String> {
        match text {
            Some(text) => Some(self.to_display(&text).await),
            None => None,
        }
    }

    /// Display fields only; ids and the approval state are left alone.
    pub async fn venue_to_display(&self, venue: Venue) -> Venue {
        Venue {
            name: self.to_display(&venue.name).await,
            description: self.to_display_opt(venue.description).await,
            address: self.to_display_opt(venue.address).await,
            category: self.to_display_opt(venue.category).await,
            ..venue
        }
    }

    pub async fn locality_to_display(&self, locality: Locality) -> Locality {
        Locality {
            name: self.to_display(&locality.name).await,
            ..locality
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::ManualClock;
    use crate::domain::model::Language;
    use crate::utils::error::OfferError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DAY: Duration = Duration::from_secs(86_400);

    fn cache_with_clock() -> (TranslationCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
        ));
        let cache = TranslationCache::new(TranslationGate::default(), DAY, 100, clock.clone());
        (cache, clock)
    }

    struct CountingTranslator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Translator for CountingTranslator {
        async fn translate(&self, text: &str, _source: Language, target: Language) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("[{}]{}", target.code(), text.trim()))
        }
    }

    #[tokio::test]
    async fn test_gated_text_bypasses_cache_and_translator() {
        let (cache, _) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        for text in ["", "2024", "https://x.org/a", "media/offers/a.jpg"] {
            let result = cache
                .get_or_translate(Direction::ToDisplay, text, |t| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(format!("translated {}", t)) }
                })
                .await;
            assert_eq!(result, text);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_equivalent_text_translates_once_within_ttl() {
        let (cache, clock) = cache_with_clock();
        let localizer = Localizer::new(
            CountingTranslator {
                calls: AtomicUsize::new(0),
            },
            Arc::new(cache),
        );

        let first = localizer.to_display("Flower Shop").await;
        let second = localizer.to_display("  flower shop ").await;
        assert_eq!(first, "[ta]Flower Shop");
        assert_eq!(second, first);
        assert_eq!(localizer.translator.calls.load(Ordering::SeqCst), 1);

        clock.advance(DAY);
        localizer.to_display("flower shop").await;
        assert_eq!(localizer.translator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_directions_are_cached_independently() {
        let (cache, _) = cache_with_clock();
        let localizer = Localizer::new(
            CountingTranslator {
                calls: AtomicUsize::new(0),
            },
            Arc::new(cache),
        );

        let display = localizer.to_display("மதுரை").await;
        let source = localizer.to_source("மதுரை").await;

        assert_eq!(display, "[ta]மதுரை");
        assert_eq!(source, "[en]மதுரை");
        assert_eq!(localizer.translator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_degrades_without_caching() {
        let (cache, _) = cache_with_clock();

        let short = cache
            .get_or_translate(Direction::ToDisplay, "sa", |_| async {
                Err(OfferError::TranslationError {
                    message: "quota exceeded".to_string(),
                })
            })
            .await;
        assert_eq!(short, "எஸ்ஏ");

        let long = cache
            .get_or_translate(Direction::ToDisplay, "Sri Murugan Stores", |_| async {
                Err(OfferError::TranslationError {
                    message: "quota exceeded".to_string(),
                })
            })
            .await;
        assert_eq!(long, "Sri Murugan Stores");

        let query = cache
            .get_or_translate(Direction::ToSource, "மதுரை", |_| async {
                Err(OfferError::TranslationError {
                    message: "offline".to_string(),
                })
            })
            .await;
        assert_eq!(query, "மதுரை");

        assert_eq!(cache.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_empty_and_noop_results_use_fallback() {
        let (cache, _) = cache_with_clock();

        let empty = cache
            .get_or_translate(Direction::ToDisplay, "Bakery", |_| async { Ok("  ".to_string()) })
            .await;
        assert_eq!(empty, "Bakery");

        let noop = cache
            .get_or_translate(Direction::ToDisplay, "tv", |t| async move { Ok(t) })
            .await;
        assert_eq!(noop, "டிவி");

        assert_eq!(cache.cached_entries(), 0);
    }
}
