//! Custom error types for provider operations

use thiserror::Error;

/// Errors raised while talking to the translation provider
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Provider answered with an unexpected status
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status returned by the provider
        status: u16,
        /// Provider's explanation
        message: String,
    },

    /// Provider rejected the auth key
    #[error("Authorization failure, check auth_key: {message}")]
    AuthorizationError {
        /// Provider's explanation
        message: String,
    },

    /// Rate limit exceeded
    #[error("Too many requests, DeepL servers are currently experiencing high load: {message}")]
    RateLimitError {
        /// Provider's explanation
        message: String,
    },

    /// Character quota for the billing period is used up
    #[error("Quota for this billing period has been exceeded: {message}")]
    QuotaExceededError {
        /// Provider's explanation
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        /// Transport failure text
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        /// Decoding failure
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong
        message: String,
    },

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl TranslationError {
    /// Map a non-success provider status and its body to an error
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = provider_message(body);

        match status {
            403 => TranslationError::AuthorizationError { message },
            429 => TranslationError::RateLimitError { message },
            456 => TranslationError::QuotaExceededError { message },
            _ => TranslationError::ApiError { status, message },
        }
    }
}

/// Pull `message` and `detail` out of a DeepL error body, falling back to the raw text
fn provider_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    let message = json["message"].as_str().unwrap_or_default();
    let detail = json["detail"].as_str().unwrap_or_default();

    match (message.is_empty(), detail.is_empty()) {
        (false, false) => format!("{}, {}", message, detail),
        (false, true) => message.to_string(),
        (true, false) => detail.to_string(),
        (true, true) => body.trim().to_string(),
    }
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, TranslationError>;
