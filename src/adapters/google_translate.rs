use crate::domain::model::Language;
use crate::domain::ports::Translator;
use crate::utils::error::{OfferError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Client for the public `translate_a/single` endpoint (`client=gtx`).
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String> {
        tracing::debug!(
            "Translating {} chars {} -> {}",
            text.chars().count(),
            source.code(),
            target.code()
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source.code()),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OfferError::TranslationError {
                message: format!("translator responded with HTTP {}", status),
            });
        }

        let body: serde_json::Value = response.json().await?;
        parse_segments(&body)
    }
}

/// The body is `[[["translated", "original", ...], ...], ...]`; long input is split into
/// several segments that are concatenated back.
fn parse_segments(body: &serde_json::Value) -> Result<String> {
    let translated: String = body
        .get(0)
        .and_then(|segments| segments.as_array())
        .map(|segments| {
            segments
                .iter()
                .filter_map(|segment| segment.get(0).and_then(|s| s.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if translated.trim().is_empty() {
        return Err(OfferError::TranslationError {
            message: "translator returned no text".to_string(),
        });
    }
    Ok(translated)
}
