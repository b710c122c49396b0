//! Maps a JD record pushed by the Airtable automation onto our JD shape.

use serde_json::Value;

use crate::airtable::{field_text, Fields};
use crate::models::jd::{JobType, Modality, NewJd};

fn text(fields: &Fields, key: &str) -> String {
    field_text(fields, key)
        .map(|v| v.into_owned())
        .unwrap_or_default()
}

/// Splits a multi-line cell into trimmed, non-empty lines.
fn split_by_line(input: &str) -> Vec<String> {
    input
        .split('\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Multi-select cells arrive as arrays; long text cells as strings.
fn lines(fields: &Fields, key: &str) -> Vec<String> {
    match fields.get(key) {
        Some(Value::String(s)) => split_by_line(s),
        Some(Value::Array(items)) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n");
            split_by_line(&joined)
        }
        _ => Vec::new(),
    }
}

pub fn map_modality(raw: &str) -> Modality {
    let m = raw.to_lowercase();
    if m.contains("hybrid") {
        Modality::Hybrid
    } else if m.contains("regional") {
        Modality::RemoteRegional
    } else if m.contains("on-site") {
        Modality::OnSite
    } else {
        Modality::RemoteLocal
    }
}

fn job_type(fields: &Fields) -> JobType {
    let hourly = match fields.get("Hourly Type") {
        Some(Value::String(s)) => s.contains("Part-Time"),
        Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some("Part-Time")),
        _ => false,
    };
    if hourly {
        JobType::PartTime
    } else {
        JobType::FullTime
    }
}

fn company(fields: &Fields) -> String {
    fields
        .get("Companies/Roles")
        .and_then(|v| v.get(0))
        .and_then(|first| first.get("name"))
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| "Unknown".to_string())
}

pub fn jd_from_airtable(fields: &Fields) -> NewJd {
    NewJd {
        code: text(fields, "Recruitment role code").trim().to_string(),
        title: text(fields, "Role Name"),
        description: text(fields, "Description"),
        job_type: job_type(fields),
        location: text(fields, "Buscando talento en"),
        modality: map_modality(&text(fields, "On-site / Remote")),
        stack: lines(fields, "Stack"),
        about_us: text(fields, "About us"),
        about_client: text(fields, "About client"),
        responsibilities: lines(fields, "Responsibilities"),
        requirements: lines(fields, "Requirements"),
        nice_to_have: lines(fields, "Nice to have"),
        benefits: lines(fields, "Benefits"),
        company: company(fields),
        archived: false,
    }
}
