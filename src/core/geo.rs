use crate::core::cache::TtlCache;
use crate::domain::model::Coordinates;
use crate::domain::ports::{Geocoder, LocalityDirectory};
use std::sync::Arc;
use std::time::Duration;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance on a sphere of mean Earth radius. Symmetric in its arguments.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat.to_radians() - a.lat.to_radians()).abs();
    let d_lng = (b.lng.to_radians() - a.lng.to_radians()).abs();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

pub fn round_to_tenth(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

pub fn normalize_place_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Resolves free-text place names to coordinates: directory first, then the geo cache, then one
/// bounded call to the external geocoder. Absence is a normal outcome.
pub struct GeoResolver<L: LocalityDirectory, G: Geocoder> {
    directory: Arc<L>,
    geocoder: G,
    cache: Arc<TtlCache<Coordinates>>,
    timeout: Duration,
}

impl<L: LocalityDirectory, G: Geocoder> GeoResolver<L, G> {
    pub fn new(
        directory: Arc<L>,
        geocoder: G,
        cache: Arc<TtlCache<Coordinates>>,
        timeout: Duration,
    ) -> Self {
        Self {
            directory,
            geocoder,
            cache,
            timeout,
        }
    }

    pub async fn resolve_coordinates(&self, name: &str) -> Option<Coordinates> {
        let key = normalize_place_name(name);
        if key.is_empty() {
            return None;
        }

        match self.directory.find_by_name(name).await {
            Ok(localities) => {
                if let Some(coordinates) = localities.iter().find_map(|l| l.coordinates) {
                    tracing::debug!("Resolved {:?} from the locality directory", name);
                    return Some(coordinates);
                }
            }
            Err(e) => tracing::warn!("Locality lookup for {:?} failed: {}", name, e),
        }

        self.resolve_unlisted(name).await
    }

    /// Cache then geocoder, for names the caller already looked up in the directory.
    pub async fn resolve_unlisted(&self, name: &str) -> Option<Coordinates> {
        let key = normalize_place_name(name);
        if key.is_empty() {
            return None;
        }

        if let Some(coordinates) = self.cache.get(&key) {
            tracing::debug!("Geo cache hit for {:?}", key);
            return Some(coordinates);
        }

        match tokio::time::timeout(self.timeout, self.geocoder.geocode(name.trim())).await {
            Ok(Ok(Some(coordinates))) => {
                tracing::info!(
                    "Geocoded {:?} to ({:.4}, {:.4})",
                    name,
                    coordinates.lat,
                    coordinates.lng
                );
                self.cache.insert(key, coordinates);
                Some(coordinates)
            }
            Ok(Ok(None)) => {
                tracing::info!("Geocoder found no match for {:?}", name);
                None
            }
            Ok(Err(e)) => {
                tracing::warn!("Geocoding {:?} failed: {}", name, e);
                None
            }
            Err(_) => {
                tracing::warn!("Geocoding {:?} timed out after {:?}", name, self.timeout);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::SystemClock;
    use crate::domain::model::{EntityId, Locality};
    use crate::utils::error::{OfferError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MADURAI: Coordinates = Coordinates {
        lat: 9.9252,
        lng: 78.1198,
    };
    const DINDIGUL: Coordinates = Coordinates {
        lat: 10.3624,
        lng: 77.9695,
    };

    struct Directory {
        localities: Vec<Locality>,
    }

    #[async_trait]
    impl LocalityDirectory for Directory {
        async fn find_by_name(&self, name: &str) -> Result<Vec<Locality>> {
            Ok(self
                .localities
                .iter()
                .filter(|l| l.name.eq_ignore_ascii_case(name.trim()))
                .cloned()
                .collect())
        }

        async fn find_by_name_prefix(&self, _prefix: &str, _limit: usize) -> Result<Vec<Locality>> {
            Ok(Vec::new())
        }

        async fn find_by_id(&self, _id: &EntityId) -> Result<Option<Locality>> {
            Ok(None)
        }

        async fn find_all_with_coordinates(&self) -> Result<Vec<Locality>> {
            Ok(self.localities.clone())
        }
    }

    enum Behaviour {
        Found(Coordinates),
        Empty,
        Fails,
        Hangs,
    }

    struct FakeGeocoder {
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl FakeGeocoder {
        fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn geocode(&self, _name: &str) -> Result<Option<Coordinates>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Found(c) => Ok(Some(c)),
                Behaviour::Empty => Ok(None),
                Behaviour::Fails => Err(OfferError::GeocodingError {
                    message: "HTTP 503".to_string(),
                }),
                Behaviour::Hangs => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(None)
                }
            }
        }
    }

    fn locality(name: &str, coordinates: Option<Coordinates>) -> Locality {
        Locality {
            id: EntityId::parse(&name.to_lowercase()).unwrap(),
            name: name.to_string(),
            district: None,
            state: Some("Tamil Nadu".to_string()),
            coordinates,
        }
    }

    fn resolver(
        localities: Vec<Locality>,
        behaviour: Behaviour,
    ) -> GeoResolver<Directory, FakeGeocoder> {
        GeoResolver::new(
            Arc::new(Directory { localities }),
            FakeGeocoder::new(behaviour),
            Arc::new(TtlCache::new(
                Duration::from_secs(86_400),
                100,
                Arc::new(SystemClock),
            )),
            Duration::from_secs(3),
        )
    }

    #[test]
    fn test_haversine_symmetry_and_identity() {
        assert_eq!(haversine_km(MADURAI, DINDIGUL), haversine_km(DINDIGUL, MADURAI));
        assert_eq!(haversine_km(MADURAI, MADURAI), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        let km = haversine_km(MADURAI, DINDIGUL);
        assert!((km - 51.3).abs() < 0.1, "got {}", km);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(12.298), 12.3);
        assert_eq!(round_to_tenth(24.96), 25.0);
        assert_eq!(round_to_tenth(0.04), 0.0);
    }

    #[tokio::test]
    async fn test_directory_coordinates_skip_geocoder() {
        let resolver = resolver(vec![locality("Madurai", Some(MADURAI))], Behaviour::Empty);

        let resolved = resolver.resolve_coordinates("MADURAI").await;

        assert_eq!(resolved, Some(MADURAI));
        assert_eq!(resolver.geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_geocoder_result_is_cached() {
        let resolver = resolver(vec![locality("Madurai", None)], Behaviour::Found(DINDIGUL));

        assert_eq!(resolver.resolve_coordinates("Madurai").await, Some(DINDIGUL));
        assert_eq!(resolver.resolve_coordinates(" madurai ").await, Some(DINDIGUL));
        assert_eq!(resolver.geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_resolve_to_none_and_are_not_cached() {
        let empty = resolver(vec![], Behaviour::Empty);
        assert_eq!(empty.resolve_coordinates("Nowhere").await, None);
        assert_eq!(empty.resolve_coordinates("Nowhere").await, None);
        assert_eq!(empty.geocoder.calls.load(Ordering::SeqCst), 2);

        let failing = resolver(vec![], Behaviour::Fails);
        assert_eq!(failing.resolve_coordinates("Nowhere").await, None);
        assert!(failing.cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_geocoder_times_out() {
        let resolver = resolver(vec![], Behaviour::Hangs);
        assert_eq!(resolver.resolve_coordinates("Slowtown").await, None);
    }

    #[tokio::test]
    async fn test_unlisted_lookup_ignores_directory() {
        let resolver = resolver(vec![locality("Madurai", Some(MADURAI))], Behaviour::Found(DINDIGUL));

        assert_eq!(resolver.resolve_unlisted("Madurai").await, Some(DINDIGUL));
        assert_eq!(resolver.resolve_coordinates("Madurai").await, Some(MADURAI));
        assert_eq!(resolver.resolve_unlisted("madurai").await, Some(DINDIGUL));
        assert_eq!(resolver.geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.resolve_unlisted(" ").await, None);
    }

    #[tokio::test]
    async fn test_blank_name_is_absent() {
        let resolver = resolver(vec![], Behaviour::Found(MADURAI));
        assert_eq!(resolver.resolve_coordinates("   ").await, None);
        assert_eq!(resolver.geocoder.calls.load(Ordering::SeqCst), 0);
    }
}
