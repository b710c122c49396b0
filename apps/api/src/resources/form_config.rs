//! Describes the candidate application form from the Airtable table schema,
//! so the frontend can render the same fields the recruiters' view shows.

use std::collections::HashSet;

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::airtable::{FieldSchema, ListParams, Record, TableSchema, ViewSchema};
use crate::errors::AppError;
use crate::extract::{Json, Query};
use crate::i18n::Bilingual;
use crate::postulations::fields::APPLICATIONS_TABLE;
use crate::state::AppState;

const DEFAULT_VIEW: &str = "RecruiterFormWebView";
const SAMPLE_SIZE: u32 = 100;

/// Internal or computed columns never offered to applicants.
const EXCLUDED_FIELDS: [&str; 9] = [
    "ID",
    "Created Time",
    "Last Modified Time",
    "Created",
    "Internal code",
    "Year applied",
    "Month applied",
    "Nombre completo",
    "Add to candidate presentation",
];

#[derive(Debug, Deserialize)]
pub struct FormConfigQuery {
    pub view: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub field_name: String,
    pub airtable_field: String,
    #[serde(rename = "type")]
    pub field_type: &'static str,
    pub label: String,
    pub placeholder: String,
    pub instructions: String,
    pub required: bool,
    pub options: Option<Vec<String>>,
    pub validation: Option<FieldValidation>,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u64>,
}

/// How the visible columns of a view were discovered.
#[derive(Debug, PartialEq)]
pub enum VisibleFields {
    Ids(Vec<String>),
    Names(Vec<String>),
    All,
}

/// "Correo electrónico" → "correoElectrnico", "First-name" → "firstName".
pub fn to_camel_case(name: &str) -> String {
    let camel: String = name
        .trim()
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '+'))
        .filter(|w| !w.is_empty())
        .enumerate()
        .map(|(i, word)| {
            let mut chars = word.chars();
            let Some(first) = chars.next() else {
                return String::new();
            };
            if i == 0 {
                first.to_lowercase().chain(chars).collect()
            } else {
                first
                    .to_uppercase()
                    .chain(chars.as_str().to_lowercase().chars())
                    .collect()
            }
        })
        .collect::<String>()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    let mut chars = camel.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            first.to_ascii_lowercase().to_string() + chars.as_str()
        }
        _ => camel,
    }
}

pub fn map_field_type(airtable_type: &str) -> &'static str {
    match airtable_type {
        "email" => "email",
        "url" => "url",
        "singleSelect" => "select",
        "multipleSelects" => "multi-select",
        "multilineText" => "textarea",
        "number" => "number",
        "attachment" => "file",
        "date" => "date",
        "phoneNumber" => "tel",
        _ => "text",
    }
}

/// Field names in the order they first appear across `records`.
pub fn names_in_appearance_order(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(|r| r.fields.keys())
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Table fields shown by the view. Id selection keeps table order; name
/// selection follows the order of `names`.
pub fn select_fields<'a>(table: &'a TableSchema, visible: &VisibleFields) -> Vec<&'a FieldSchema> {
    match visible {
        VisibleFields::Ids(ids) if !ids.is_empty() => table
            .fields
            .iter()
            .filter(|f| ids.contains(&f.id))
            .collect(),
        VisibleFields::Names(names) if !names.is_empty() => names
            .iter()
            .filter_map(|name| table.fields.iter().find(|f| &f.name == name))
            .collect(),
        _ => table.fields.iter().collect(),
    }
}

pub fn build_form(fields: &[&FieldSchema]) -> Vec<FormField> {
    fields
        .iter()
        .filter(|f| !EXCLUDED_FIELDS.contains(&f.name.as_str()))
        .enumerate()
        .map(|(i, field)| FormField {
            field_name: to_camel_case(&field.name),
            airtable_field: field.name.clone(),
            field_type: map_field_type(&field.field_type),
            label: field.name.clone(),
            placeholder: String::new(),
            instructions: field.description.clone().unwrap_or_default(),
            required: field.is_required(),
            options: field.select_choices(),
            validation: (field.field_type == "number" && field.options.is_some()).then(|| {
                FieldValidation {
                    decimals: field.decimals(),
                }
            }),
            order: i + 1,
        })
        .collect()
}

/// Visible field ids from the listing, else from the view metadata endpoint.
async fn view_field_ids(
    state: &AppState,
    table: &TableSchema,
    view: &ViewSchema,
) -> Option<Vec<String>> {
    if let Some(ids) = view.embedded_field_ids() {
        return Some(ids);
    }
    match state.airtable.view_metadata(&table.id, &view.id).await {
        Ok(metadata) => Some(metadata.field_ids()),
        Err(e) => {
            warn!("View metadata for {} unavailable: {e}", view.name);
            None
        }
    }
}

/// Falls back to the columns present in a sample of the view's records.
async fn sampled_field_names(state: &AppState, view_name: &str) -> VisibleFields {
    let params = ListParams {
        view: Some(view_name),
        max_records: Some(SAMPLE_SIZE),
        ..Default::default()
    };
    match state.airtable.list_records(APPLICATIONS_TABLE, &params).await {
        Ok(records) => VisibleFields::Names(names_in_appearance_order(&records)),
        Err(e) => {
            warn!("Sampling view {view_name} failed, using every field: {e}");
            VisibleFields::All
        }
    }
}

/// GET /form-config
pub async fn handle_form_config(
    State(state): State<AppState>,
    Query(query): Query<FormConfigQuery>,
) -> Result<Json<Vec<FormField>>, AppError> {
    let view_name = query.view.as_deref().unwrap_or(DEFAULT_VIEW);

    let tables = state
        .airtable
        .table_schemas()
        .await
        .map_err(|e| match e.status() {
            Some(401 | 403) => AppError::Denied(Bilingual::new(
                "Airtable metadata API access denied. Please check API key permissions.",
                "Acceso denegado a la API de metadata de Airtable. Por favor verifique los permisos de la API key.",
            )),
            _ => AppError::unexpected(
                e,
                "fetching table metadata from Airtable",
                "obtener metadata de la tabla desde Airtable",
            ),
        })?;
    let table = tables
        .iter()
        .find(|t| t.name == APPLICATIONS_TABLE)
        .ok_or_else(|| AppError::not_found("Table not found", "Tabla no encontrada"))?;

    let view_ids = match table.views.iter().find(|v| v.name == view_name) {
        Some(view) => view_field_ids(&state, table, view).await,
        None => {
            warn!("View {view_name} not found in {APPLICATIONS_TABLE}");
            None
        }
    };
    let visible = match view_ids {
        Some(ids) => VisibleFields::Ids(ids),
        None => sampled_field_names(&state, view_name).await,
    };

    let form = build_form(&select_fields(table, &visible));
    info!("Form config for view {view_name}: {} fields", form.len());
    Ok(Json(form))
}
