//! `Json` and `Query` extractors whose rejections render as `AppError`,
//! so malformed input gets the same bilingual body as every other failure.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::warn;

use crate::errors::AppError;
use crate::i18n::Bilingual;

#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        warn!("Rejected request body: {detail}");
        AppError::Validation(Bilingual::new(
            format!("Invalid request body: {detail}"),
            format!("Cuerpo de la solicitud inválido: {detail}"),
        ))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let detail = rejection.body_text();
        warn!("Rejected query string: {detail}");
        AppError::Validation(Bilingual::new(
            format!("Invalid query parameters: {detail}"),
            format!("Parámetros de consulta inválidos: {detail}"),
        ))
    }
}
