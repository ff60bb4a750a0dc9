// Adapters layer: concrete implementations of the domain ports (directory, translator, geocoder)

pub mod directory;
pub mod google_translate;
pub mod nominatim;

pub use directory::{DirectorySnapshot, InMemoryDirectory, LoadReport};
pub use google_translate::GoogleTranslator;
pub use nominatim::NominatimGeocoder;
