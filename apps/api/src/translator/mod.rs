//! Machine translation clients.
//!
//! Posts are translated with DeepL, job descriptions with Azure Translator.
//! Both sit behind the `Translator` trait so handlers can be exercised with fakes.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Translation response contained no text")]
    EmptyResponse,
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates `text` between ISO language codes (`es`, `en`).
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, TranslateError>;
}

fn http_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap_or_default()
}

async fn api_error(response: reqwest::Response) -> TranslateError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    TranslateError::Api { status, message }
}

// ────────────────────────────────────────────────────────────────────────────
// DeepL
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DeeplTranslator {
    client: Client,
    api_url: String,
    auth_key: String,
}

#[derive(Debug, Deserialize)]
struct DeeplResponse {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    text: String,
}

impl DeeplTranslator {
    pub fn new(api_url: &str, auth_key: String) -> Self {
        Self {
            client: http_client(),
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_key,
        }
    }
}

/// DeepL wants upper-case codes and a regional variant for English targets.
fn deepl_lang(code: &str, is_target: bool) -> String {
    match code.to_ascii_lowercase().as_str() {
        "en" if is_target => "EN-US".to_string(),
        other => other.to_ascii_uppercase(),
    }
}

#[async_trait]
impl Translator for DeeplTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let source_lang = deepl_lang(source, false);
        let target_lang = deepl_lang(target, true);
        let response = self
            .client
            .post(format!("{}/v2/translate", self.api_url))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.auth_key))
            .form(&[
                ("text", text),
                ("source_lang", source_lang.as_str()),
                ("target_lang", target_lang.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: DeeplResponse = response.json().await?;
        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or(TranslateError::EmptyResponse)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Azure Translator
// ────────────────────────────────────────────────────────────────────────────

const AZURE_API_VERSION: &str = "3.0";

#[derive(Clone)]
pub struct AzureTranslator {
    client: Client,
    endpoint: String,
    key: String,
    region: String,
}

#[derive(Debug, Serialize)]
struct AzureText<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct AzureResult {
    translations: Vec<TranslatedText>,
}

impl AzureTranslator {
    pub fn new(endpoint: &str, key: String, region: String) -> Self {
        Self {
            client: http_client(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
            region,
        }
    }
}

#[async_trait]
impl Translator for AzureTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let response = self
            .client
            .post(format!("{}/translate", self.endpoint))
            .query(&[
                ("api-version", AZURE_API_VERSION),
                ("from", source),
                ("to", target),
            ])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Ocp-Apim-Subscription-Region", &self.region)
            .json(&[AzureText { text }])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let results: Vec<AzureResult> = response.json().await?;
        let translated = results
            .into_iter()
            .next()
            .and_then(|r| r.translations.into_iter().next())
            .map(|t| t.text)
            .ok_or(TranslateError::EmptyResponse)?;

        if translated == text {
            warn!("Translation identical to source text: {text:?}");
        }
        Ok(translated)
    }
}

/// Translates Spanish to English, returning the source text when the call fails.
pub async fn translate_or_keep(translator: &dyn Translator, text: &str) -> String {
    match translator.translate(text, "es", "en").await {
        Ok(translated) => translated,
        Err(e) => {
            warn!("Translation failed, keeping source text: {e}");
            text.to_string()
        }
    }
}

/// Outcome of probing the translator configuration.
#[derive(Debug, Serialize)]
pub struct TranslatorCheck {
    pub success: bool,
    pub message: String,
    pub details: Value,
}

const SAMPLE_TEXT: &str = "Hola mundo";

/// Translates a fixed phrase to confirm the translator credentials work.
pub async fn check_translator(
    translator: &dyn Translator,
    endpoint: &str,
    region: &str,
) -> TranslatorCheck {
    info!("Probing translator at {endpoint} (region {region})");

    match translator.translate(SAMPLE_TEXT, "es", "en").await {
        Ok(translated) => TranslatorCheck {
            success: true,
            message: "Translator configuration is working".to_string(),
            details: json!({
                "original": SAMPLE_TEXT,
                "translated": translated,
                "endpoint": endpoint,
                "region": region,
            }),
        },
        Err(e) => {
            let status = match &e {
                TranslateError::Api { status, .. } => Some(*status),
                TranslateError::Http(err) => err.status().map(|s| s.as_u16()),
                TranslateError::EmptyResponse => None,
            };
            warn!("Translator check failed: {e}");
            TranslatorCheck {
                success: false,
                message: format!("Configuration error: {e}"),
                details: json!({
                    "error": e.to_string(),
                    "status": status,
                    "endpoint": endpoint,
                }),
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_deepl_lang_codes() {
        assert_eq!(deepl_lang("es", false), "ES");
        assert_eq!(deepl_lang("en", true), "EN-US");
        assert_eq!(deepl_lang("en", false), "EN");
    }

    #[tokio::test]
    async fn test_deepl_sends_auth_header_and_form() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/translate")
                    .header("Authorization", "DeepL-Auth-Key abc:fx")
                    .body_contains("target_lang=EN-US");
                then.status(200)
                    .json_body(json!({"translations": [{"detected_source_language": "ES", "text": "Hello"}]}));
            })
            .await;

        let translator = DeeplTranslator::new(&server.base_url(), "abc:fx".into());
        let out = translator.translate("Hola", "es", "en").await.unwrap();

        mock.assert_async().await;
        assert_eq!(out, "Hello");
    }

    #[tokio::test]
    async fn test_azure_translates_and_skips_blank() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/translate")
                    .query_param("api-version", "3.0")
                    .query_param("from", "es")
                    .query_param("to", "en")
                    .header("Ocp-Apim-Subscription-Key", "k")
                    .body_contains("\"Text\":\"Desarrollador\"");
                then.status(200)
                    .json_body(json!([{"translations": [{"text": "Developer", "to": "en"}]}]));
            })
            .await;

        let translator = AzureTranslator::new(&server.base_url(), "k".into(), "global".into());
        assert_eq!(translator.translate("   ", "es", "en").await.unwrap(), "");
        assert_eq!(
            translator.translate("Desarrollador", "es", "en").await.unwrap(),
            "Developer"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_translate_or_keep_falls_back() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/translate");
                then.status(401).body("invalid key");
            })
            .await;

        let translator = AzureTranslator::new(&server.base_url(), "bad".into(), "global".into());
        assert_eq!(translate_or_keep(&translator, "Remoto").await, "Remoto");

        let check = check_translator(&translator, &server.base_url(), "global").await;
        assert!(!check.success);
        assert_eq!(check.details["status"], 401);
    }
}
