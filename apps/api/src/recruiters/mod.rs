//! Recruiter lookups against the Airtable payroll tables.

pub mod handlers;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::airtable::{field_equals, AirtableClient, AirtableError, Fields, Record};

/// Tables that may hold recruiters, searched in order.
pub const RECRUITER_TABLES: &[&str] = &[
    "LinkIT - Recruiters",
    "Recruiters",
    "Payroll",
    "LinkIT - Payroll",
];

/// First recruiter whose `URL Slug` equals `slug`.
/// A failing table is skipped; the error only surfaces when every table failed.
pub async fn find_by_slug(
    airtable: &AirtableClient,
    slug: &str,
) -> Result<Option<Record>, AirtableError> {
    let formula = field_equals("URL Slug", slug);
    let mut any_answered = false;
    let mut last_error = None;

    for table in RECRUITER_TABLES {
        match airtable.first_record(table, &formula).await {
            Ok(Some(record)) => {
                debug!("Recruiter '{slug}' found in table '{table}'");
                return Ok(Some(record));
            }
            Ok(None) => any_answered = true,
            Err(e) => {
                warn!("Recruiter lookup in '{table}' failed: {e}");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if !any_answered => Err(e),
        _ => Ok(None),
    }
}

/// `Active` wins when present; otherwise `Status` must read "active". No field at all means active.
pub fn is_active(fields: &Fields) -> bool {
    if let Some(active) = fields.get("Active").and_then(Value::as_bool) {
        return active;
    }
    match fields.get("Status").and_then(Value::as_str) {
        Some(status) => status.eq_ignore_ascii_case("active"),
        None => true,
    }
}

fn text(fields: &Fields, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterResponse {
    pub id: String,
    pub name: String,
    pub last_name: String,
    pub url_slug: String,
    pub email: String,
    pub photo_url: String,
    pub active: bool,
    pub form_url: String,
    pub recruitment_role_code: Option<String>,
    pub recruitment_role_name: Option<String>,
}

impl RecruiterResponse {
    pub fn from_record(record: &Record, slug: &str, role_code: Option<&str>) -> Self {
        let fields = &record.fields;
        let photo_url = fields
            .get("Photo")
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("url"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let url_slug = Some(text(fields, "URL Slug"))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slug.to_string());

        Self {
            id: record.id.clone(),
            name: text(fields, "Name"),
            last_name: text(fields, "Last name"),
            url_slug,
            email: text(fields, "Email"),
            photo_url,
            active: is_active(fields),
            form_url: text(fields, "Form URL"),
            recruitment_role_code: role_code
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
            recruitment_role_name: None,
        }
    }
}
