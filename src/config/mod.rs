#[cfg(feature = "cli")]
pub mod cli;
pub mod lambda;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

/// One lookup per invocation; `--offer-id`, `--venue-id` and `--suggest` take precedence over
/// `--city` in that order.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "nearby-offers")]
#[command(about = "Look up shop offers for a Tamil Nadu city, falling back to the nearest town")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "City name to look up offers for")]
    pub city: Option<String>,

    #[arg(long, default_value = "en", help = "Response language: en or ta")]
    pub lang: String,

    #[arg(long, help = "Show one offer with the venue's other offers")]
    pub offer_id: Option<String>,

    #[arg(long, help = "List the approved offers of one venue")]
    pub venue_id: Option<String>,

    #[arg(long, help = "Suggest locality names starting with this prefix")]
    pub suggest: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        use crate::utils::error::OfferError;
        use crate::utils::validation::*;

        if let Some(path) = &self.config {
            validate_file_extension("config", path, &["toml"])?;
        }

        let requested = [&self.city, &self.offer_id, &self.venue_id, &self.suggest];
        if requested.iter().all(|value| value.is_none()) {
            return Err(OfferError::MissingConfigError {
                field: "city".to_string(),
            });
        }
        for (field, value) in [("city", &self.city), ("suggest", &self.suggest)] {
            if let Some(value) = value {
                validate_non_empty_string(field, value)?;
            }
        }
        Ok(())
    }
}
