#[cfg(feature = "lambda")]
use aws_config::BehaviorVersion;
#[cfg(feature = "lambda")]
use aws_sdk_s3::config::Region;
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use nearby_offers::config::lambda::{LambdaConfig, S3Storage};
#[cfg(feature = "lambda")]
use nearby_offers::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use nearby_offers::{handlers, AppContext};
#[cfg(feature = "lambda")]
use serde::Deserialize;
#[cfg(feature = "lambda")]
use std::sync::Arc;

/// One of `offer_id`, `venue_id`, `suggest` or `city`, checked in that order.
#[cfg(feature = "lambda")]
#[derive(Debug, Deserialize)]
pub struct Request {
    pub city: Option<String>,
    pub lang: Option<String>,
    pub offer_id: Option<String>,
    pub venue_id: Option<String>,
    pub suggest: Option<String>,
}

#[cfg(feature = "lambda")]
async fn function_handler(
    context: &AppContext,
    event: LambdaEvent<Request>,
) -> Result<serde_json::Value, Error> {
    let request = event.payload;
    tracing::info!("Handling request {:?}", request);
    let lang = request.lang.as_deref();

    let body = if let Some(offer_id) = &request.offer_id {
        serde_json::to_value(handlers::handle_offer_details(context, offer_id, lang).await)?
    } else if let Some(venue_id) = &request.venue_id {
        serde_json::to_value(handlers::handle_venue_offers(context, venue_id, lang).await)?
    } else if let Some(prefix) = &request.suggest {
        serde_json::to_value(handlers::handle_suggestions(context, prefix, lang).await)?
    } else {
        let city = request.city.as_deref().unwrap_or_default();
        serde_json::to_value(handlers::handle_offers(context, city, lang).await)?
    };
    Ok(body)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let lambda_config = LambdaConfig::from_env()?;
    lambda_config.validate()?;

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let region = Region::new(lambda_config.s3_region.clone());
    let config = aws_sdk_s3::config::Builder::from(&config)
        .region(region)
        .force_path_style(true)
        .build();
    let s3_client = S3Client::from_conf(config);
    let storage = S3Storage::new(s3_client, lambda_config.s3_bucket.clone());

    // Built once per cold start so both caches survive across invocations.
    let context = Arc::new(AppContext::load(&lambda_config, &storage).await?);
    tracing::info!(
        "✅ Directory ready: {:?}",
        context.load_report().unwrap_or_default()
    );

    run(service_fn(move |event: LambdaEvent<Request>| {
        let context = context.clone();
        async move { function_handler(&context, event).await }
    }))
    .await
}
