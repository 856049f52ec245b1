//! Core data models for translation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Text payload of a translate call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPayload {
    /// A single string, answered with a single result
    Single(String),
    /// An ordered batch, answered with results in the same order
    Batch(Vec<String>),
}

/// A validated translate request
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    /// Text or texts to translate
    pub text: TextPayload,
    /// Source language, `None` to let the provider detect it
    pub source_lang: Option<String>,
    /// Target language code
    pub target_lang: String,
    /// Extra provider options
    pub options: TranslateOptions,
}

impl TranslationRequest {
    /// Create a request with auto-detected source and no options
    pub fn new(text: TextPayload, target_lang: impl Into<String>) -> Self {
        Self {
            text,
            source_lang: None,
            target_lang: target_lang.into(),
            options: TranslateOptions::default(),
        }
    }

    /// Set the source language
    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = Some(source_lang.into());
        self
    }

    /// Set the provider options
    pub fn with_options(mut self, options: TranslateOptions) -> Self {
        self.options = options;
        self
    }
}

/// Provider options forwarded with a translate call.
///
/// Keys are stored in the provider's snake_case parameter form; camelCase
/// keys are converted on the way in, and the values of known options are
/// rewritten into the form the provider accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TranslateOptions(Map<String, Value>);

impl TranslateOptions {
    /// Build from a caller-supplied JSON object
    pub fn from_json(object: Map<String, Value>) -> Self {
        let params = object
            .into_iter()
            .map(|(key, value)| {
                let key = provider_param_name(&key);
                let value = provider_param_value(&key, value);
                (key, value)
            })
            .collect();
        Self(params)
    }

    /// Value of a parameter, by provider name
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Parameters in provider form
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Map an option name to the provider's request parameter name
fn provider_param_name(key: &str) -> String {
    match key {
        "glossary" => "glossary_id".to_string(),
        _ => {
            let mut out = String::with_capacity(key.len() + 4);
            for ch in key.chars() {
                if ch.is_ascii_uppercase() {
                    out.push('_');
                    out.push(ch.to_ascii_lowercase());
                } else {
                    out.push(ch);
                }
            }
            out
        }
    }
}

/// Rewrite an option value into the provider's accepted form
fn provider_param_value(key: &str, value: Value) -> Value {
    match (key, value) {
        ("split_sentences", Value::String(mode)) => {
            let mode = mode.to_ascii_lowercase();
            match mode.as_str() {
                "on" | "default" => Value::from("1"),
                "off" => Value::from("0"),
                _ => Value::String(mode),
            }
        }
        ("formality", Value::String(formality)) => {
            Value::String(formality.to_ascii_lowercase())
        }
        ("glossary_id", Value::Object(glossary)) => {
            let id = glossary
                .get("glossaryId")
                .or_else(|| glossary.get("glossary_id"))
                .cloned();
            id.unwrap_or(Value::Object(glossary))
        }
        (_, value) => value,
    }
}

/// Translation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    /// Translated text
    pub text: String,
    /// Source language, detected or as given
    pub detected_source_lang: String,
    /// Characters billed for this text, when the provider reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billed_characters: Option<u64>,
    /// Model type the provider used, when it reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type_used: Option<String>,
}

/// Supported language as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDescriptor {
    /// Display name, e.g. "English"
    pub name: String,
    /// Language code
    pub code: String,
    /// Whether `formality` is accepted for this target; unset for sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_formality: Option<bool>,
}

impl LanguageDescriptor {
    /// Create a descriptor without formality information
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            supports_formality: None,
        }
    }

    /// Set formality support
    pub fn with_formality(mut self, supports_formality: bool) -> Self {
        self.supports_formality = Some(supports_formality);
        self
    }
}

/// Normalise a language code: base language lower-case, region upper-case
pub fn standardize_language_code(code: &str) -> String {
    match code.split_once('-') {
        Some((base, region)) => format!(
            "{}-{}",
            base.to_ascii_lowercase(),
            region.to_ascii_uppercase()
        ),
        None => code.to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standardize_language_code() {
        assert_eq!(standardize_language_code("DE"), "de");
        assert_eq!(standardize_language_code("EN-GB"), "en-GB");
        assert_eq!(standardize_language_code("pt-br"), "pt-BR");
        assert_eq!(standardize_language_code("ZH-HANS"), "zh-HANS");
    }

    #[test]
    fn test_options_are_normalised() {
        let raw = json!({
            "formality": "less",
            "splitSentences": "nonewlines",
            "preserve_formatting": true,
            "glossary": "def3a26b",
            "tagHandling": "html",
        });
        let options = TranslateOptions::from_json(raw.as_object().unwrap().clone());

        assert_eq!(options.get("formality"), Some(&json!("less")));
        assert_eq!(options.get("split_sentences"), Some(&json!("nonewlines")));
        assert_eq!(options.get("preserve_formatting"), Some(&json!(true)));
        assert_eq!(options.get("glossary_id"), Some(&json!("def3a26b")));
        assert_eq!(options.get("tag_handling"), Some(&json!("html")));
        assert!(options.get("glossary").is_none());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = TranslationResult {
            text: "Hola".to_string(),
            detected_source_lang: "en".to_string(),
            billed_characters: None,
            model_type_used: Some("quality_optimized".to_string()),
        };

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "text": "Hola",
                "detectedSourceLang": "en",
                "modelTypeUsed": "quality_optimized",
            })
        );
    }

    #[test]
    fn test_option_values_take_provider_form() {
        let raw = json!({
            "splitSentences": "off",
            "formality": "PREFER_LESS",
            "glossary": {"glossaryId": "g1", "name": "terms"},
        });
        let options = TranslateOptions::from_json(raw.as_object().unwrap().clone());

        assert_eq!(options.get("split_sentences"), Some(&json!("0")));
        assert_eq!(options.get("formality"), Some(&json!("prefer_less")));
        assert_eq!(options.get("glossary_id"), Some(&json!("g1")));

        let modes = [
            ("on", "1"),
            ("Default", "1"),
            ("0", "0"),
            ("NoNewlines", "nonewlines"),
        ];
        for (mode, expected) in modes {
            let options = TranslateOptions::from_json(
                json!({"split_sentences": mode}).as_object().unwrap().clone(),
            );
            assert_eq!(options.get("split_sentences"), Some(&json!(expected)));
        }
    }
}
