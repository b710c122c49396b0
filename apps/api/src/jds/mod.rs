pub mod airtable_mapper;
pub mod handlers;
pub mod repository;
pub mod status;
pub mod translation;

use axum::http::HeaderMap;

use crate::errors::AppError;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Airtable automations authenticate with a shared secret when one is configured.
pub fn check_webhook_secret(headers: &HeaderMap, expected: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let provided = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    if provided == Some(expected) {
        Ok(())
    } else {
        tracing::warn!("Rejected sync request with missing or wrong webhook secret");
        Err(AppError::Unauthorized)
    }
}
