//! HTTP API server implementation

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::core::client::{DeepLTranslator, SharedProvider};
use crate::core::config::ServerConfig;
use crate::core::errors::TranslationError;
use crate::core::models::{
    LanguageDescriptor, TextPayload, TranslateOptions, TranslationRequest, TranslationResult,
};
use crate::server::cors;

/// Rejection message for the `text` form of the translate body
pub const MISSING_TEXT_FIELDS: &str = "Missing required fields: text, target_lang";

/// Rejection message for the legacy `texts` form of the translate body
pub const MISSING_TEXTS_FIELDS: &str =
    "Missing required fields: texts (must be non-empty array), target_lang";

/// Rejection message for a non-object `options`
pub const INVALID_OPTIONS: &str = "Invalid field: options (must be an object)";

/// Application state
#[derive(Clone)]
pub struct AppState {
    translator: Option<SharedProvider>,
}

impl AppState {
    /// State for a router with or without a provider
    pub fn new(translator: Option<SharedProvider>) -> Self {
        Self { translator }
    }

    /// The provider, or the 500 every dependent route answers without one
    fn translator(&self) -> Result<&SharedProvider, ApiError> {
        self.translator.as_ref().ok_or_else(|| {
            debug!("Rejected request: {}", ApiError::NotConfigured);
            ApiError::NotConfigured
        })
    }
}

/// Errors surfaced to HTTP callers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing request fields
    #[error("{0}")]
    BadRequest(String),

    /// No auth key was configured at startup
    #[error("DEEPL_AUTH_KEY not configured on server")]
    NotConfigured,

    /// The provider call failed
    #[error("{context}: {source}")]
    Upstream {
        /// Which call failed, sent as `error`
        context: &'static str,
        /// Underlying failure, sent as `details`
        #[source]
        source: TranslationError,
    },
}

impl ApiError {
    fn upstream(context: &'static str) -> impl FnOnce(TranslationError) -> Self {
        move |source| {
            error!("{}: {}", context, source);
            ApiError::Upstream { context, source }
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Fixed description of the failure
    pub error: String,
    /// Provider message, for upstream failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Upstream { context, source } => ErrorResponse {
                error: context.to_string(),
                details: Some(source.to_string()),
            },
            other => ErrorResponse {
                error: other.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    translator: String,
}

/// Successful translate response
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    /// Translation of the request's text
    pub result: TranslateOutput,
}

/// One result per text, shaped like the request's text field
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TranslateOutput {
    /// Answer to a single string
    One(TranslationResult),
    /// Answers to an array, in order
    Many(Vec<TranslationResult>),
}

/// Language catalog response
#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    /// Supported languages
    pub languages: Vec<LanguageDescriptor>,
}

/// Validate a translate body into a request.
///
/// Accepts `text` as a string or an array of strings, and the legacy
/// `texts` array.
pub fn parse_translate_body(body: &Value) -> Result<TranslationRequest, ApiError> {
    let target_lang = body
        .get("target_lang")
        .and_then(Value::as_str)
        .filter(|lang| !lang.is_empty());

    let (text, missing) = match body.get("texts").filter(|texts| !texts.is_null()) {
        Some(texts) => (string_array(texts).map(TextPayload::Batch), MISSING_TEXTS_FIELDS),
        None => (body.get("text").and_then(text_payload), MISSING_TEXT_FIELDS),
    };

    let (Some(text), Some(target_lang)) = (text, target_lang) else {
        return Err(ApiError::BadRequest(missing.to_string()));
    };

    let options = match body.get("options") {
        None | Some(Value::Null) => TranslateOptions::default(),
        Some(Value::Object(map)) => TranslateOptions::from_json(map.clone()),
        Some(_) => return Err(ApiError::BadRequest(INVALID_OPTIONS.to_string())),
    };

    let mut request = TranslationRequest::new(text, target_lang).with_options(options);
    if let Some(source_lang) = body
        .get("source_lang")
        .and_then(Value::as_str)
        .filter(|lang| !lang.is_empty())
    {
        request = request.with_source_lang(source_lang);
    }

    Ok(request)
}

fn text_payload(value: &Value) -> Option<TextPayload> {
    match value {
        Value::String(text) if !text.is_empty() => Some(TextPayload::Single(text.clone())),
        Value::Array(_) => string_array(value).map(TextPayload::Batch),
        _ => None,
    }
}

/// A non-empty array whose elements are all strings
fn string_array(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array().filter(|items| !items.is_empty())?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Health check handler
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        translator: if state.translator.is_some() {
            "configured"
        } else {
            "not_configured"
        }
        .to_string(),
    })
}

/// Translation handler
async fn translate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug!("Unreadable translate body: {}", rejection);
            Value::Null
        }
    };

    let request = parse_translate_body(&body).map_err(|e| {
        debug!("Rejected translate request: {}", e);
        e
    })?;
    let translator = state.translator()?;

    let source_lang = request.source_lang.as_deref();
    let target_lang = request.target_lang.as_str();
    let on_error = ApiError::upstream("DeepL translation failed");

    let result = match &request.text {
        TextPayload::Single(text) => translator
            .translate_one(text, source_lang, target_lang, &request.options)
            .await
            .map(TranslateOutput::One),
        TextPayload::Batch(texts) => translator
            .translate_many(texts, source_lang, target_lang, &request.options)
            .await
            .map(TranslateOutput::Many),
    }
    .map_err(on_error)?;

    Ok(Json(TranslateResponse { result }))
}

/// Source languages handler
async fn source_languages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LanguagesResponse>, ApiError> {
    let languages = state
        .translator()?
        .source_languages()
        .await
        .map_err(ApiError::upstream("Failed to fetch source languages from DeepL"))?
        .into_iter()
        .map(|lang| LanguageDescriptor::new(lang.name, lang.code))
        .collect();

    Ok(Json(LanguagesResponse { languages }))
}

/// Target languages handler
async fn target_languages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LanguagesResponse>, ApiError> {
    let languages = state
        .translator()?
        .target_languages()
        .await
        .map_err(ApiError::upstream("Failed to fetch target languages from DeepL"))?
        .into_iter()
        .map(|lang| {
            let supports_formality = lang.supports_formality.unwrap_or(false);
            LanguageDescriptor::new(lang.name, lang.code).with_formality(supports_formality)
        })
        .collect();

    Ok(Json(LanguagesResponse { languages }))
}

/// Build the router with CORS and request tracing
pub fn build_router(state: AppState, allowed_origins: &[String]) -> anyhow::Result<Router> {
    let cors = cors::cors_layer(allowed_origins)?;

    Ok(Router::new()
        .route("/", get(health_check))
        .route("/translate", post(translate))
        .route("/source-languages", get(source_languages))
        .route("/target-languages", get(target_languages))
        .with_state(Arc::new(state))
        .layer(cors)
        .layer(middleware::from_fn(cors::finalize_cors_response))
        .layer(TraceLayer::new_for_http()))
}

/// Run the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    // Create translator
    let translator = DeepLTranslator::from_config(&config)?;

    // Create router
    let app = build_router(AppState::new(translator), &config.allowed_origins)?;

    // Bind address
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server listening on http://{}", listener.local_addr()?);

    // Start server
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
