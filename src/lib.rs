//! DeepL Proxy - thin HTTP front for the DeepL translation API
//!
//! Exposes `POST /translate`, `GET /source-languages` and
//! `GET /target-languages`, forwarding each call to DeepL and reshaping the
//! response for browser clients.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    client::{DeepLTranslator, SharedProvider, TranslationProvider},
    config::ServerConfig,
    errors::TranslationError,
    models::{
        LanguageDescriptor, TextPayload, TranslateOptions, TranslationRequest, TranslationResult,
    },
};

pub use crate::server::api::{build_router, run_server, ApiError, AppState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
