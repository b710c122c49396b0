use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::i18n::Lang;
use crate::models::blank;

pub const LOCATION_MAX_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Freelance,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Freelance => "freelance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Modality {
    RemoteLocal,
    RemoteRegional,
    Hybrid,
    OnSite,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::RemoteLocal => "remote-local",
            Modality::RemoteRegional => "remote-regional",
            Modality::Hybrid => "hybrid",
            Modality::OnSite => "on-site",
        }
    }
}

/// English copy of a JD's translatable fields. Empty strings mean "not translated".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JdTranslation {
    pub title: String,
    pub description: String,
    pub location: String,
    pub modality: String,
    pub stack: Vec<String>,
    pub about_us: String,
    pub about_client: String,
    #[serde(rename = "responsabilities")]
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Jd {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub location: String,
    pub modality: String,
    pub stack: Vec<String>,
    pub about_us: String,
    pub about_client: String,
    #[serde(rename = "responsabilities")]
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub benefits: Vec<String>,
    pub archived: bool,
    pub company: String,
    pub created_date: DateTime<Utc>,
    pub en: Option<Json<JdTranslation>>,
}

impl Jd {
    /// The stored English copy mirrors the Spanish text, i.e. translation never happened.
    pub fn has_untranslated_copy(&self) -> bool {
        match &self.en {
            Some(Json(en)) => {
                en.title == self.title
                    || en.description == self.description
                    || en.location == self.location
            }
            None => false,
        }
    }

    /// No English copy yet, or one that was cleared.
    pub fn lacks_translation(&self) -> bool {
        match &self.en {
            Some(Json(en)) => en.title.is_empty(),
            None => true,
        }
    }

    /// Overlays non-empty English values when `lang` is English.
    pub fn localized(mut self, lang: Lang) -> Self {
        if lang != Lang::En {
            return self;
        }
        let Some(Json(en)) = self.en.clone() else {
            return self;
        };

        fn text(target: &mut String, value: String) {
            if !value.trim().is_empty() {
                *target = value;
            }
        }
        fn list(target: &mut Vec<String>, value: Vec<String>) {
            if !value.is_empty() {
                *target = value;
            }
        }

        text(&mut self.title, en.title);
        text(&mut self.description, en.description);
        text(&mut self.location, en.location);
        text(&mut self.about_us, en.about_us);
        text(&mut self.about_client, en.about_client);
        list(&mut self.stack, en.stack);
        list(&mut self.responsibilities, en.responsibilities);
        list(&mut self.requirements, en.requirements);
        list(&mut self.nice_to_have, en.nice_to_have);
        list(&mut self.benefits, en.benefits);
        self
    }
}

/// Payload for creating a JD.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJd {
    pub code: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub location: String,
    pub modality: Modality,
    #[serde(default)]
    pub stack: Vec<String>,
    #[serde(default)]
    pub about_us: String,
    #[serde(default)]
    pub about_client: String,
    #[serde(rename = "responsabilities", default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub nice_to_have: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub company: String,
    #[serde(default)]
    pub archived: bool,
}

fn validate_location(location: &str) -> Result<(), AppError> {
    let len = location.trim().chars().count();
    if len == 0 || location.chars().count() > LOCATION_MAX_CHARS {
        return Err(AppError::validation(
            "Location must be between 1 and 60 characters",
            "La ubicación debe tener entre 1 y 60 caracteres",
        ));
    }
    Ok(())
}

fn validate_requirements(requirements: &[String]) -> Result<(), AppError> {
    if requirements.is_empty() {
        return Err(AppError::validation(
            "Add at least one requirement to create the JD",
            "Agrega al menos un requisito para crear la JD",
        ));
    }
    Ok(())
}

fn missing_field(field: &str) -> AppError {
    AppError::Validation(crate::i18n::Bilingual::new(
        format!("Missing required field: {field}"),
        format!("Falta el campo requerido: {field}"),
    ))
}

impl NewJd {
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("code", &self.code),
            ("title", &self.title),
            ("description", &self.description),
            ("company", &self.company),
        ] {
            if blank(value) {
                return Err(missing_field(name));
            }
        }
        validate_location(&self.location)?;
        validate_requirements(&self.requirements)
    }
}

/// Partial update of a JD. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JdPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub modality: Option<Modality>,
    pub stack: Option<Vec<String>>,
    pub about_us: Option<String>,
    pub about_client: Option<String>,
    #[serde(rename = "responsabilities")]
    pub responsibilities: Option<Vec<String>>,
    pub requirements: Option<Vec<String>>,
    pub nice_to_have: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub company: Option<String>,
    pub archived: Option<bool>,
}

impl JdPatch {
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("company", &self.company),
        ] {
            if value.as_deref().is_some_and(blank) {
                return Err(missing_field(name));
            }
        }
        if let Some(location) = &self.location {
            validate_location(location)?;
        }
        if let Some(requirements) = &self.requirements {
            validate_requirements(requirements)?;
        }
        Ok(())
    }

    /// True when the patch changes any text that has an English copy.
    pub fn touches_translatable(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.location.is_some()
            || self.stack.is_some()
            || self.about_us.is_some()
            || self.about_client.is_some()
            || self.responsibilities.is_some()
            || self.requirements.is_some()
            || self.nice_to_have.is_some()
            || self.benefits.is_some()
    }
}

#[cfg(test)]
pub fn test_jd(code: &str, title: &str) -> Jd {
    Jd {
        id: Uuid::new_v4(),
        code: code.to_string(),
        title: title.to_string(),
        description: "Buscamos una persona desarrolladora".to_string(),
        job_type: JobType::FullTime.as_str().to_string(),
        location: "Argentina".to_string(),
        modality: Modality::RemoteLocal.as_str().to_string(),
        stack: vec!["Rust".to_string()],
        about_us: String::new(),
        about_client: String::new(),
        responsibilities: vec!["Diseñar servicios".to_string()],
        requirements: vec!["3 años de experiencia".to_string()],
        nice_to_have: vec![],
        benefits: vec![],
        archived: false,
        company: "Acme".to_string(),
        created_date: Utc::now(),
        en: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_jd_json() -> serde_json::Value {
        json!({
            "code": "LIT-101",
            "title": "Desarrollador Backend",
            "description": "Rol backend",
            "type": "full-time",
            "location": "LATAM",
            "modality": "remote-regional",
            "requirements": ["Rust"],
            "company": "Acme"
        })
    }

    #[test]
    fn test_new_jd_defaults_and_validation() {
        let jd: NewJd = serde_json::from_value(new_jd_json()).unwrap();
        assert_eq!(jd.modality, Modality::RemoteRegional);
        assert!(jd.stack.is_empty());
        assert!(!jd.archived);
        assert!(jd.validate().is_ok());
    }

    #[test]
    fn test_new_jd_requires_requirement() {
        let mut value = new_jd_json();
        value["requirements"] = json!([]);
        let jd: NewJd = serde_json::from_value(value).unwrap();
        let err = jd.validate().unwrap_err();
        assert!(err.to_string().contains("at least one requirement"));
    }

    #[test]
    fn test_location_length_bounds() {
        let mut value = new_jd_json();
        value["location"] = json!("x".repeat(61));
        let jd: NewJd = serde_json::from_value(value).unwrap();
        assert!(jd.validate().is_err());

        let mut value = new_jd_json();
        value["location"] = json!("ñ".repeat(60));
        let jd: NewJd = serde_json::from_value(value).unwrap();
        assert!(jd.validate().is_ok());
    }

    #[test]
    fn test_unknown_modality_rejected() {
        let mut value = new_jd_json();
        value["modality"] = json!("remote");
        assert!(serde_json::from_value::<NewJd>(value).is_err());
    }

    #[test]
    fn test_serialized_field_names() {
        let jd = test_jd("LIT-1", "Dev");
        let value = serde_json::to_value(&jd).unwrap();
        assert!(value.get("_id").is_some());
        assert_eq!(value["type"], "full-time");
        assert!(value.get("responsabilities").is_some());
        assert!(value.get("niceToHave").is_some());
        assert!(value.get("createdDate").is_some());
    }

    #[test]
    fn test_translation_state() {
        let mut jd = test_jd("LIT-1", "Desarrollador");
        assert!(jd.lacks_translation());
        assert!(!jd.has_untranslated_copy());

        jd.en = Some(Json(JdTranslation {
            title: "Desarrollador".into(),
            description: "Rol".into(),
            ..Default::default()
        }));
        assert!(!jd.lacks_translation());
        assert!(jd.has_untranslated_copy());

        jd.en = Some(Json(JdTranslation::default()));
        assert!(jd.lacks_translation());
    }

    #[test]
    fn test_localized_overlays_non_empty_values() {
        let mut jd = test_jd("LIT-1", "Desarrollador");
        jd.en = Some(Json(JdTranslation {
            title: "Developer".into(),
            requirements: vec!["3 years of experience".into()],
            ..Default::default()
        }));

        let es = jd.clone().localized(Lang::Es);
        assert_eq!(es.title, "Desarrollador");

        let en = jd.localized(Lang::En);
        assert_eq!(en.title, "Developer");
        assert_eq!(en.requirements, vec!["3 years of experience"]);
        assert_eq!(en.location, "Argentina");
        assert_eq!(en.responsibilities, vec!["Diseñar servicios"]);
    }

    #[test]
    fn test_patch_translatable_detection() {
        let patch: JdPatch = serde_json::from_value(json!({"archived": true})).unwrap();
        assert!(!patch.touches_translatable());
        let patch: JdPatch = serde_json::from_value(json!({"title": "Nuevo"})).unwrap();
        assert!(patch.touches_translatable());
        let patch: JdPatch = serde_json::from_value(json!({"requirements": []})).unwrap();
        assert!(patch.validate().is_err());
    }
}
