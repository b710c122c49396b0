use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::airtable::AirtableError;
use crate::i18n::{Bilingual, Lang, LocalizedError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// The body is rendered in Spanish; `localize_errors` swaps it for English when asked.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {}", .0.en)]
    NotFound(Bilingual),

    #[error("Validation error: {}", .0.en)]
    Validation(Bilingual),

    #[error("Not acceptable: {}", .0.en)]
    NotAcceptable(Bilingual),

    #[error("Conflict: {}", .0.en)]
    Conflict(Bilingual),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    /// Access refused by an upstream service on our behalf.
    #[error("Denied: {}", .0.en)]
    Denied(Bilingual),

    #[error("Too many requests, retry in {retry_after_secs}s")]
    TooManyRequests { retry_after_secs: u64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Airtable error: {0}")]
    Airtable(#[from] AirtableError),

    #[error("Translation error: {0}")]
    Translation(String),

    /// An upstream or unclassified failure while performing `action`.
    #[error("Unexpected error while {}: {detail}", .action.en)]
    Unexpected { detail: String, action: Bilingual },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(en: &str, es: &str) -> Self {
        AppError::NotFound(Bilingual::new(en, es))
    }

    pub fn validation(en: &str, es: &str) -> Self {
        AppError::Validation(Bilingual::new(en, es))
    }

    pub fn not_acceptable(en: &str, es: &str) -> Self {
        AppError::NotAcceptable(Bilingual::new(en, es))
    }

    pub fn conflict(en: &str, es: &str) -> Self {
        AppError::Conflict(Bilingual::new(en, es))
    }

    pub fn unexpected(detail: impl ToString, en_action: &str, es_action: &str) -> Self {
        AppError::Unexpected {
            detail: detail.to_string(),
            action: Bilingual::new(en_action, es_action),
        }
    }

    pub fn invalid_filter() -> Self {
        AppError::not_acceptable("Invalid filter parameter", "Parametro de filtrado invalido")
    }

    pub fn invalid_id() -> Self {
        AppError::not_acceptable("Invalid id", "Id inválido")
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::Denied(_) => StatusCode::FORBIDDEN,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_)
            | AppError::Airtable(_)
            | AppError::Translation(_)
            | AppError::Unexpected { .. }
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code and user-facing message. Logs server-side failures.
    fn describe(&self) -> (&'static str, Bilingual) {
        match self {
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::NotAcceptable(msg) => ("NOT_ACCEPTABLE", msg.clone()),
            AppError::Conflict(msg) => ("CONFLICT", msg.clone()),
            AppError::Unauthorized => (
                "UNAUTHORIZED",
                Bilingual::new("Unauthorized", "No autorizado"),
            ),
            AppError::Forbidden => (
                "FORBIDDEN",
                Bilingual::new(
                    "You do not have permission to perform this action",
                    "No tienes permisos para realizar esta acción",
                ),
            ),
            AppError::Denied(msg) => ("FORBIDDEN", msg.clone()),
            AppError::TooManyRequests { .. } => (
                "TOO_MANY_REQUESTS",
                Bilingual::new(
                    "Too many requests from this IP. Please try again later.",
                    "Demasiadas solicitudes desde esta IP. Por favor, inténtalo más tarde.",
                ),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    "DATABASE_ERROR",
                    Bilingual::new(
                        "A database error occurred",
                        "Ocurrió un error en la base de datos",
                    ),
                )
            }
            AppError::Airtable(e) => {
                tracing::error!("Airtable error: {e}");
                (
                    "AIRTABLE_ERROR",
                    Bilingual::new(
                        "An error occurred while requesting airtable info",
                        "Ocurrió un error al requerir informacion de airtable",
                    ),
                )
            }
            AppError::Translation(msg) => {
                tracing::error!("Translation error: {msg}");
                (
                    "TRANSLATION_ERROR",
                    Bilingual::new("Error translating post", "Error al traducir la publicación"),
                )
            }
            AppError::Unexpected { detail, action } => {
                tracing::error!("Unexpected error while {}: {detail}", action.en);
                (
                    "UNEXPECTED_ERROR",
                    Bilingual::new(
                        format!("An unexpected error occurred while {}", action.en),
                        format!("Ocurrió un error inesperado al {}", action.es),
                    ),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    Bilingual::new(
                        "An internal server error occurred",
                        "Ocurrió un error interno del servidor",
                    ),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = self.describe();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message.pick(Lang::default())
            }
        }));

        let mut response = (status, body).into_response();
        if let AppError::TooManyRequests { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
            .extensions_mut()
            .insert(LocalizedError { code, message });
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::not_found("a", "b").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::invalid_filter().status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(
            AppError::conflict("a", "b").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::unexpected("boom", "creating postulation", "crear postulacion").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_carries_localized_message() {
        let response =
            AppError::not_found("Post not found", "Publicación no encontrada").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let localized = response.extensions().get::<LocalizedError>().unwrap();
        assert_eq!(localized.code, "NOT_FOUND");
        assert_eq!(localized.message.en, "Post not found");
    }

    #[test]
    fn test_too_many_requests_sets_retry_after() {
        let response = AppError::TooManyRequests {
            retry_after_secs: 42,
        }
        .into_response();
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "42");
    }

    #[test]
    fn test_unexpected_message_names_action() {
        let (_, msg) = AppError::unexpected("x", "signin in", "iniciar sesión").describe();
        assert_eq!(msg.en, "An unexpected error occurred while signin in");
        assert_eq!(msg.es, "Ocurrió un error inesperado al iniciar sesión");
    }
}
