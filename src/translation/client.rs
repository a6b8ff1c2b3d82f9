use crate::translation::engine::{EngineFactory, LanguagePair, TranslationEngine};
use crate::utils::{EngineConfig, Result, TranslatorError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum TextFormat {
    Text,
    Html,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: TextFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    code: String,
    #[serde(default)]
    targets: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

fn build_client(config: &EngineConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
        .build()?)
}

const BASE_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 30_000;

/// 500ms doubling per attempt, capped at 30s.
fn backoff_delay(attempt: usize) -> Duration {
    let factor = 2u64.saturating_pow(u32::try_from(attempt).unwrap_or(u32::MAX));
    Duration::from_millis(BASE_BACKOFF_MS.saturating_mul(factor).min(MAX_BACKOFF_MS))
}

fn endpoint_url(endpoint: &str, path: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), path)
}

async fn api_error(response: reqwest::Response) -> TranslatorError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or(body);
    TranslatorError::ApiError { status, message }
}

/// Client for a LibreTranslate-compatible HTTP API.
pub struct LibreTranslateEngine {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    pair: LanguagePair,
    markup_available: bool,
    max_retries: usize,
}

impl LibreTranslateEngine {
    async fn translate(&self, text: &str, format: TextFormat) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..self.max_retries.max(1) {
            match self.call_api(text, format).await {
                Ok(translated) => return Ok(translated),
                Err(e) if e.is_transient() && attempt + 1 < self.max_retries => {
                    warn!(attempt = attempt, error = %e, "Translation API call failed, retrying");
                    tokio::time::sleep(backoff_delay(attempt)).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            TranslatorError::TranslationFailed("no attempt was made".to_string())
        }))
    }

    async fn call_api(&self, text: &str, format: TextFormat) -> Result<String> {
        let request = TranslateRequest {
            q: text,
            source: &self.pair.source,
            target: &self.pair.target,
            format,
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(endpoint_url(&self.endpoint, "translate"))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: TranslateResponse = response.json().await?;
        match (body.translated_text, body.error) {
            (Some(text), _) => Ok(text),
            (None, Some(error)) => Err(TranslatorError::TranslationFailed(error)),
            (None, None) => Err(TranslatorError::TranslationFailed(
                "response had no translatedText".to_string(),
            )),
        }
    }
}

#[async_trait]
impl TranslationEngine for LibreTranslateEngine {
    async fn translate_text(&self, text: &str) -> Result<String> {
        self.translate(text, TextFormat::Text).await
    }

    async fn translate_markup(&self, text: &str) -> Result<String> {
        self.translate(text, TextFormat::Html).await
    }

    fn markup_available(&self) -> bool {
        self.markup_available
    }

    fn engine_name(&self) -> &str {
        "LibreTranslate"
    }
}

pub struct LibreTranslateFactory {
    config: EngineConfig,
}

impl LibreTranslateFactory {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    async fn fetch_languages(&self, client: &Client) -> Result<Vec<LanguageEntry>> {
        let response = client
            .get(endpoint_url(&self.config.endpoint, "languages"))
            .send()
            .await
            .map_err(|e| TranslatorError::EngineUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json().await?)
    }
}

fn pairs_from(languages: &[LanguageEntry]) -> Vec<LanguagePair> {
    languages
        .iter()
        .flat_map(|lang| {
            lang.targets
                .iter()
                .filter(move |target| **target != lang.code)
                .map(move |target| LanguagePair::new(lang.code.clone(), target.clone()))
        })
        .collect()
}

#[async_trait]
impl EngineFactory for LibreTranslateFactory {
    async fn connect(&self, pair: &LanguagePair) -> Result<Box<dyn TranslationEngine>> {
        let client = build_client(&self.config)?;
        let languages = self.fetch_languages(&client).await?;

        if !pairs_from(&languages).contains(pair) {
            return Err(TranslatorError::UnsupportedLanguagePair {
                source_lang: pair.source.clone(),
                target_lang: pair.target.clone(),
            });
        }

        debug!(pair = %pair, endpoint = %self.config.endpoint, "Connected translation engine");

        let api_key = Some(self.config.api_key.clone()).filter(|k| !k.is_empty());
        Ok(Box::new(LibreTranslateEngine {
            client,
            endpoint: self.config.endpoint.clone(),
            api_key,
            pair: pair.clone(),
            markup_available: self.config.markup_aware,
            max_retries: self.config.max_retries,
        }))
    }

    async fn available_pairs(&self) -> Result<Vec<LanguagePair>> {
        let client = build_client(&self.config)?;
        let languages = self.fetch_languages(&client).await?;
        Ok(pairs_from(&languages))
    }
}
