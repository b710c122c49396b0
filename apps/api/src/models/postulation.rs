use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::blank;

/// A candidate application as submitted by the web form.
/// Keys outside the known set are kept in `extra` and forwarded to Airtable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Postulation {
    pub cv: String,
    pub code: String,
    pub tech_stack: Vec<String>,
    pub stack: Vec<String>,
    pub email: String,
    pub country: String,
    pub linkedin: String,
    pub salary: Option<f64>,
    pub english: String,
    pub reason: String,
    pub availability: String,
    pub first_name: String,
    pub last_name: String,
    pub recruiter: Option<String>,
    pub recruiter_slug: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload keys that never travel as extra Airtable columns.
pub const RESERVED_KEYS: &[&str] = &["created"];

/// Loose shape check: one `@` with a dotted domain and no whitespace.
pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    if value.contains(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

impl Postulation {
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("code", &self.code),
            ("email", &self.email),
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("cv", &self.cv),
        ] {
            if blank(value) {
                return Err(AppError::Validation(crate::i18n::Bilingual::new(
                    format!("Missing postulation field: {name}"),
                    format!("Falta el campo de la postulación: {name}"),
                )));
            }
        }
        if !looks_like_email(&self.email) {
            return Err(AppError::validation(
                "Invalid email address",
                "Dirección de email inválida",
            ));
        }
        if self.salary.is_some_and(|s| s < 0.0) {
            return Err(AppError::validation(
                "Salary expectation cannot be negative",
                "La expectativa salarial no puede ser negativa",
            ));
        }
        Ok(())
    }

    pub fn recruiter_slug(&self) -> Option<&str> {
        self.recruiter_slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extra_keys_captured() {
        let p: Postulation = serde_json::from_value(json!({
            "code": "LIT-1",
            "email": "ana@example.com",
            "firstName": "Ana",
            "lastName": "Pérez",
            "cv": "https://cv",
            "salary": 3000,
            "Phone": "+54 11",
            "portfolio": "https://ana.dev"
        }))
        .unwrap();
        assert_eq!(p.salary, Some(3000.0));
        assert_eq!(p.extra.get("Phone").unwrap(), "+54 11");
        assert!(p.extra.get("firstName").is_none());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_missing_cv_rejected() {
        let p: Postulation = serde_json::from_value(json!({
            "code": "LIT-1",
            "email": "ana@example.com",
            "firstName": "Ana",
            "lastName": "Pérez"
        }))
        .unwrap();
        assert!(p.validate().unwrap_err().to_string().contains("cv"));
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("ana.perez@mail.example.com"));
        assert!(!looks_like_email("ana@"));
        assert!(!looks_like_email("ana@localhost"));
        assert!(!looks_like_email("ana @mail.com"));
        assert!(!looks_like_email("a@b@c.com"));
    }

    #[test]
    fn test_negative_salary_rejected() {
        let p = Postulation {
            code: "LIT-1".into(),
            email: "ana@example.com".into(),
            first_name: "Ana".into(),
            last_name: "Pérez".into(),
            cv: "cv".into(),
            salary: Some(-1.0),
            ..Default::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_recruiter_slug_trimmed() {
        let p = Postulation {
            recruiter_slug: Some("  ".into()),
            ..Default::default()
        };
        assert!(p.recruiter_slug().is_none());
    }
}
