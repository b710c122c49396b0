use axum::extract::State;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::extract::{Json, Query};
use crate::recruiters::{find_by_slug, RecruiterResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollQuery {
    pub slug: Option<String>,
    pub role_code: Option<String>,
}

/// GET /recruiters/payroll
pub async fn handle_payroll(
    State(state): State<AppState>,
    Query(query): Query<PayrollQuery>,
) -> Result<Json<RecruiterResponse>, AppError> {
    let slug = query
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::validation("Slug parameter is required", "El parámetro slug es requerido")
        })?;

    let record = find_by_slug(&state.airtable, slug)
        .await
        .map_err(|e| {
            AppError::unexpected(
                e,
                "requesting recruiter information",
                "solicitar información del recruiter",
            )
        })?
        .ok_or_else(|| AppError::not_found("Recruiter not found", "Recruiter no encontrado"))?;

    let response = RecruiterResponse::from_record(&record, slug, query.role_code.as_deref());
    if !response.active {
        return Err(AppError::not_found(
            "Recruiter is not active",
            "El recruiter no está activo",
        ));
    }

    info!("Recruiter '{slug}' resolved to {}", response.name);
    Ok(Json(response))
}
