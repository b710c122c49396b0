//! Request language negotiation and localized error bodies.

use std::collections::HashMap;
use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query, Request},
    http::{header::ACCEPT_LANGUAGE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// Language a response is rendered in. Spanish is the platform default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lang {
    En,
    #[default]
    Es,
}

impl Lang {
    pub fn parse(raw: &str) -> Option<Lang> {
        let primary = raw.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Lang::En),
            "es" => Some(Lang::Es),
            _ => None,
        }
    }

    /// `?lang=` wins over `Accept-Language`; only the first language tag is honoured.
    pub fn from_parts(parts: &Parts) -> Lang {
        if let Ok(Query(params)) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri) {
            if let Some(lang) = params.get("lang").and_then(|v| Lang::parse(v)) {
                return lang;
            }
        }

        parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|tag| Lang::parse(tag.split(';').next().unwrap_or(tag)))
            .unwrap_or_default()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Lang
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Lang::from_parts(parts))
    }
}

/// A user-facing message in both platform languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bilingual {
    pub en: String,
    pub es: String,
}

impl Bilingual {
    pub fn new(en: impl Into<String>, es: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            es: es.into(),
        }
    }

    pub fn pick(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.en,
            Lang::Es => &self.es,
        }
    }
}

/// Attached to error responses so `localize_errors` can re-render the body.
#[derive(Debug, Clone)]
pub struct LocalizedError {
    pub code: &'static str,
    pub message: Bilingual,
}

/// Rewrites error bodies into the language negotiated for the request.
pub async fn localize_errors(lang: Lang, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let Some(error) = response.extensions_mut().remove::<LocalizedError>() else {
        return response;
    };

    let status = response.status();
    let mut localized = (
        status,
        Json(json!({
            "error": {
                "code": error.code,
                "message": error.message.pick(lang),
            }
        })),
    )
        .into_response();

    // Keep headers such as retry-after set by the original response.
    for (name, value) in response.headers() {
        if name != axum::http::header::CONTENT_TYPE && name != axum::http::header::CONTENT_LENGTH {
            localized.headers_mut().insert(name.clone(), value.clone());
        }
    }
    localized
}
