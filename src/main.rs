use anyhow::Context;
use clap::Parser;
use nearby_offers::config::toml_config::TomlConfig;
use nearby_offers::handlers;
use nearby_offers::utils::{logger, validation::Validate};
use nearby_offers::{AppContext, CliConfig, LocalStorage};
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("Starting nearby-offers CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    if let Err(e) = args.validate() {
        tracing::error!("❌ Invalid arguments: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Pass --city, --offer-id, --venue-id or --suggest");
        std::process::exit(1);
    }

    let config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => TomlConfig::default(),
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    tracing::info!("✅ Configuration loaded for {}", config.service_name());

    let storage = LocalStorage::new(config.base_path());
    let context = match AppContext::load(&config, &storage).await {
        Ok(context) => context,
        Err(e) => {
            tracing::error!("❌ Failed to load directory: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let lang = Some(args.lang.as_str());
    if let Some(offer_id) = &args.offer_id {
        print_json(&handlers::handle_offer_details(&context, offer_id, lang).await)
    } else if let Some(venue_id) = &args.venue_id {
        print_json(&handlers::handle_venue_offers(&context, venue_id, lang).await)
    } else if let Some(prefix) = &args.suggest {
        print_json(&handlers::handle_suggestions(&context, prefix, lang).await)
    } else {
        let city = args.city.as_deref().unwrap_or_default();
        let response = handlers::handle_offers(&context, city, lang).await;
        if response.is_nearby_result {
            tracing::info!("📍 Showing nearby offers instead of {}", city);
        }
        print_json(&response)
    }
}

fn print_json<T: Serialize>(response: &T) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(response).context("failed to encode response")?;
    println!("{}", body);
    Ok(())
}
