//! DeepL client and the provider seam the HTTP handlers depend on

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::config::ServerConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{
    standardize_language_code, LanguageDescriptor, TranslateOptions, TranslationResult,
};

/// Base URL for keys on the free plan
pub const FREE_API_URL: &str = "https://api-free.deepl.com";

/// Base URL for keys on the pro plan
pub const PRO_API_URL: &str = "https://api.deepl.com";

/// Operations the route handlers need from a translation provider
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate one text
    async fn translate_one(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> Result<TranslationResult>;

    /// Translate a batch, results in input order
    async fn translate_many(
        &self,
        texts: &[String],
        source_lang: Option<&str>,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> Result<Vec<TranslationResult>>;

    /// Languages accepted as translation source
    async fn source_languages(&self) -> Result<Vec<LanguageDescriptor>>;

    /// Languages accepted as translation target
    async fn target_languages(&self) -> Result<Vec<LanguageDescriptor>>;
}

/// Shared handle to a provider
pub type SharedProvider = Arc<dyn TranslationProvider>;

/// `POST /v2/translate` response body
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslationEntry>,
}

#[derive(Debug, Deserialize)]
struct TranslationEntry {
    text: String,
    detected_source_language: String,
    billed_characters: Option<u64>,
    model_type_used: Option<String>,
}

/// Element of the `GET /v2/languages` response body
#[derive(Debug, Deserialize)]
struct LanguageEntry {
    language: String,
    name: String,
    supports_formality: Option<bool>,
}

/// Which catalog to ask for
#[derive(Debug, Clone, Copy)]
enum LanguageType {
    Source,
    Target,
}

impl LanguageType {
    fn as_query(self) -> &'static str {
        match self {
            LanguageType::Source => "source",
            LanguageType::Target => "target",
        }
    }
}

/// DeepL API client
#[derive(Debug, Clone)]
pub struct DeepLTranslator {
    client: reqwest::Client,
    auth_key: String,
    server_url: String,
}

impl DeepLTranslator {
    /// Create a client bound to `auth_key`, talking to `server_url` or the
    /// endpoint implied by the key
    pub fn new(auth_key: impl Into<String>, server_url: Option<String>) -> Result<Self> {
        let auth_key = auth_key.into();
        if auth_key.is_empty() {
            return Err(TranslationError::ConfigError {
                message: "auth_key must not be empty".to_string(),
            });
        }

        let server_url = server_url
            .unwrap_or_else(|| default_server_url(&auth_key).to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            auth_key,
            server_url,
        })
    }

    /// Build the shared provider handle when the configuration carries a key
    pub fn from_config(config: &ServerConfig) -> Result<Option<SharedProvider>> {
        let Some(auth_key) = config.auth_key.as_deref() else {
            warn!("DEEPL_AUTH_KEY not set, translation routes will return 500 until configured");
            return Ok(None);
        };

        let translator = Self::new(auth_key, config.server_url.clone())?;
        info!("DeepL client initialized for {}", translator.server_url);
        Ok(Some(Arc::new(translator)))
    }

    /// Base URL requests are sent to
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn authorization(&self) -> String {
        format!("DeepL-Auth-Key {}", self.auth_key)
    }

    /// Send a translate call for `texts`
    async fn send_translate(
        &self,
        texts: &[String],
        source_lang: Option<&str>,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> Result<Vec<TranslationResult>> {
        let mut body = serde_json::Map::new();
        for (key, value) in options.iter() {
            body.insert(key.clone(), value.clone());
        }
        body.insert("text".to_string(), serde_json::json!(texts));
        body.insert("target_lang".to_string(), serde_json::json!(target_lang));
        if let Some(source_lang) = source_lang {
            body.insert("source_lang".to_string(), serde_json::json!(source_lang));
        }

        debug!(
            "Translating {} text(s) to {} (source: {})",
            texts.len(),
            target_lang,
            source_lang.unwrap_or("auto")
        );

        let response = self
            .client
            .post(format!("{}/v2/translate", self.server_url))
            .header("Authorization", self.authorization())
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let parsed: TranslateResponse = read_json(response).await?;

        if parsed.translations.len() != texts.len() {
            return Err(TranslationError::InvalidResponseError {
                message: format!(
                    "expected {} translations, got {}",
                    texts.len(),
                    parsed.translations.len()
                ),
            });
        }

        Ok(parsed
            .translations
            .into_iter()
            .map(|entry| TranslationResult {
                text: entry.text,
                detected_source_lang: standardize_language_code(&entry.detected_source_language),
                billed_characters: entry.billed_characters,
                model_type_used: entry.model_type_used,
            })
            .collect())
    }

    /// Fetch one of the language catalogs
    async fn fetch_languages(&self, kind: LanguageType) -> Result<Vec<LanguageDescriptor>> {
        let response = self
            .client
            .get(format!("{}/v2/languages", self.server_url))
            .header("Authorization", self.authorization())
            .query(&[("type", kind.as_query())])
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let entries: Vec<LanguageEntry> = read_json(response).await?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let descriptor =
                    LanguageDescriptor::new(entry.name, standardize_language_code(&entry.language));
                match kind {
                    LanguageType::Source => descriptor,
                    LanguageType::Target => {
                        descriptor.with_formality(entry.supports_formality.unwrap_or(false))
                    }
                }
            })
            .collect())
    }
}

/// Pick the endpoint a key belongs to
pub fn default_server_url(auth_key: &str) -> &'static str {
    if auth_key.ends_with(":fx") {
        FREE_API_URL
    } else {
        PRO_API_URL
    }
}

/// Decode a provider response, mapping non-success statuses to errors
async fn read_json<T>(response: reqwest::Response) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(TranslationError::from_status(status.as_u16(), &error_text));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| TranslationError::InvalidResponseError {
            message: e.to_string(),
        })
}

#[async_trait]
impl TranslationProvider for DeepLTranslator {
    async fn translate_one(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> Result<TranslationResult> {
        let texts = [text.to_string()];
        self.send_translate(&texts, source_lang, target_lang, options)
            .await?
            .pop()
            .ok_or_else(|| TranslationError::InvalidResponseError {
                message: "No translation in response".to_string(),
            })
    }

    async fn translate_many(
        &self,
        texts: &[String],
        source_lang: Option<&str>,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> Result<Vec<TranslationResult>> {
        self.send_translate(texts, source_lang, target_lang, options)
            .await
    }

    async fn source_languages(&self) -> Result<Vec<LanguageDescriptor>> {
        self.fetch_languages(LanguageType::Source).await
    }

    async fn target_languages(&self) -> Result<Vec<LanguageDescriptor>> {
        self.fetch_languages(LanguageType::Target).await
    }
}
