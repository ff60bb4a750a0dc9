pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

#[cfg(feature = "lambda")]
pub use config::lambda::{LambdaConfig, S3Storage};

pub use adapters::{GoogleTranslator, InMemoryDirectory, NominatimGeocoder};
pub use app::{handlers, AppContext};
pub use config::toml_config::TomlConfig;
pub use core::offers::OfferFallbackEngine;
pub use utils::error::{OfferError, Result};
