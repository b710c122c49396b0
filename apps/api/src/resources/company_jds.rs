use axum::extract::State;
use serde::Deserialize;
use tracing::debug;

use crate::airtable::{field_text, Fields, ListParams};
use crate::errors::AppError;
use crate::extract::{Json, Query};
use crate::state::AppState;

const FOLLOW_UP_TABLE: &str = "LinkIT - Clients Follow up";
const FOLLOW_UP_VIEW: &str = "Creemos JDs";

#[derive(Debug, Default, Deserialize)]
pub struct CompanyJdsQuery {
    pub company: Option<String>,
    pub code: Option<String>,
    pub area: Option<String>,
}

/// Applies the first filter present, in `company`, `code`, `area` order.
pub fn filter_follow_ups(records: Vec<Fields>, query: &CompanyJdsQuery) -> Vec<Fields> {
    if let Some(company) = &query.company {
        let needle = company.to_lowercase();
        return records
            .into_iter()
            .filter(|r| field_text(r, "Client").is_some_and(|c| c.to_lowercase().contains(&needle)))
            .collect();
    }
    if let Some(code) = &query.code {
        return records
            .into_iter()
            .filter(|r| field_text(r, "Role Code").is_some_and(|c| c == code.as_str()))
            .collect();
    }
    if let Some(area) = &query.area {
        let area = area.to_lowercase();
        return records
            .into_iter()
            .filter(|r| field_text(r, "Area").is_some_and(|a| a.to_lowercase() == area))
            .collect();
    }
    records
}

/// GET /company-jds
pub async fn handle_company_jds(
    State(state): State<AppState>,
    Query(query): Query<CompanyJdsQuery>,
) -> Result<Json<Vec<Fields>>, AppError> {
    let params = ListParams {
        view: Some(FOLLOW_UP_VIEW),
        ..Default::default()
    };
    let records = state
        .airtable
        .list_records(FOLLOW_UP_TABLE, &params)
        .await
        .map_err(|e| {
            AppError::unexpected(e, "requesting airtable info", "requerir informacion de airtable")
        })?
        .into_iter()
        .map(|r| r.fields)
        .collect();

    let filtered = filter_follow_ups(records, &query);
    debug!("Company JDs query {query:?} matched {} records", filtered.len());
    Ok(Json(filtered))
}
