//! Candidate application → Airtable columns.

use serde_json::{Number, Value};

use crate::airtable::Fields;
use crate::models::postulation::{Postulation, RESERVED_KEYS};

pub const APPLICATIONS_TABLE: &str = "LinkIT - Candidate application";

fn is_phone_key(key: &str) -> bool {
    let key = key.to_lowercase();
    key == "phone" || key == "telefono"
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn strings(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

/// Builds the record to store. Empty values are dropped and only the first phone column survives.
pub fn application_fields(postulation: &Postulation, recruiter: Option<&str>) -> Fields {
    let p = postulation;
    let salary = p
        .salary
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null);
    let recruiter = recruiter
        .or(p.recruiter.as_deref())
        .map(|r| Value::String(r.to_string()))
        .unwrap_or(Value::Null);

    let known = [
        ("Candidate Stack + PM tools", strings(&p.stack)),
        ("LinkedIn", Value::String(p.linkedin.clone())),
        ("Salary expectation (USD)", salary),
        ("Country", Value::String(p.country.clone())),
        ("English Level", Value::String(p.english.clone())),
        ("Why Change", Value::String(p.reason.clone())),
        ("Candidate Email", Value::String(p.email.clone())),
        ("When to start availability", Value::String(p.availability.clone())),
        ("Nombre", Value::String(p.first_name.clone())),
        ("Apellido", Value::String(p.last_name.clone())),
        ("What would be your area of expertise?", strings(&p.tech_stack)),
        ("Recruiter", recruiter),
        ("CV", Value::String(p.cv.clone())),
        ("Rol al que aplica", Value::String(p.code.clone())),
    ];
    let extras = p
        .extra
        .iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.as_str(), value.clone()));

    let mut fields = Fields::new();
    let mut phone_kept = false;
    for (key, value) in known.into_iter().chain(extras) {
        if is_empty_value(&value) {
            continue;
        }
        if is_phone_key(key) {
            if phone_kept {
                continue;
            }
            phone_kept = true;
        }
        fields.insert(key.to_string(), value);
    }
    fields
}
