pub mod cache;
pub mod catalog;
pub mod gate;
pub mod geo;
pub mod offers;
pub mod translation;

pub use crate::domain::model::{
    Coordinates, Direction, EntityId, Language, Locality, MediaKind, MediaRef, Promotion,
    PromotionStatus, Venue, VenueStatus,
};
pub use crate::domain::ports::{
    Clock, ConfigProvider, Geocoder, LocalityDirectory, Storage, Translator, VenueDirectory,
};
pub use crate::utils::error::Result;
