use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::airtable::Fields;
use crate::errors::AppError;
use crate::extract::Json;
use crate::i18n::{Bilingual, Lang};
use crate::state::AppState;

const CONTACTS_TABLE: &str = "Contactos";
const SERVICE_COLUMN: &str = "¿Qué servicio te interesa?";

/// Message from the public "contact us" form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub service: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub web: Option<String>,
}

/// Talent request from the company landing form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TalentRequest {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub empresa: Option<String>,
    pub buscando_talento: Option<String>,
    pub correo: Option<String>,
    pub telefono: Option<String>,
    pub pais: Option<String>,
    pub perfil: Option<String>,
}

fn columns(pairs: &[(&str, &Option<String>)]) -> Fields {
    pairs
        .iter()
        .filter_map(|(column, value)| {
            value
                .as_deref()
                .map(|v| (column.to_string(), Value::String(v.to_string())))
        })
        .collect()
}

impl ContactRequest {
    pub fn to_fields(&self) -> Fields {
        columns(&[
            ("Nombre", &self.first_name),
            ("Apellido", &self.last_name),
            ("Empresa", &self.company),
            (SERVICE_COLUMN, &self.service),
            ("Email", &self.email),
            ("Mensaje", &self.message),
            ("WebCliente", &self.web),
        ])
    }
}

impl TalentRequest {
    pub fn to_fields(&self) -> Fields {
        columns(&[
            ("Nombre", &self.nombre),
            ("Apellido", &self.apellido),
            ("Empresa", &self.empresa),
            (SERVICE_COLUMN, &self.buscando_talento),
            ("Email", &self.correo),
            ("Phone Number", &self.telefono),
            ("Pais", &self.pais),
            ("Rol buscado", &self.perfil),
        ])
    }
}

#[derive(Debug, Serialize)]
pub struct SentResponse {
    pub message: String,
}

fn sent(lang: Lang) -> Json<SentResponse> {
    let message = Bilingual::new(
        "Your information has been sent successfully",
        "Tu información ha sido enviada con éxito",
    );
    Json(SentResponse {
        message: message.pick(lang).to_string(),
    })
}

/// POST /contact-us
pub async fn handle_contact_us(
    State(state): State<AppState>,
    lang: Lang,
    Json(req): Json<ContactRequest>,
) -> Result<Json<SentResponse>, AppError> {
    state
        .airtable
        .create_records(CONTACTS_TABLE, &[req.to_fields()])
        .await
        .map_err(|e| {
            AppError::unexpected(e, "create a contact request", "crear una peticion de contacto")
        })?;
    info!("Contact request stored");
    Ok(sent(lang))
}

/// POST /contact-us/form
pub async fn handle_talent_form(
    State(state): State<AppState>,
    lang: Lang,
    Json(req): Json<TalentRequest>,
) -> Result<Json<SentResponse>, AppError> {
    state
        .airtable
        .create_records(CONTACTS_TABLE, &[req.to_fields()])
        .await
        .map_err(|e| {
            AppError::unexpected(e, "create a talent request", "crear una solicitud de talento")
        })?;
    info!("Talent request stored");
    Ok(sent(lang))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contact_columns() {
        let req: ContactRequest = serde_json::from_value(json!({
            "firstName": "Ana",
            "company": "Acme",
            "service": "Staffing",
            "web": "https://acme.com"
        }))
        .unwrap();
        let fields = req.to_fields();

        assert_eq!(fields["Nombre"], "Ana");
        assert_eq!(fields[SERVICE_COLUMN], "Staffing");
        assert_eq!(fields["WebCliente"], "https://acme.com");
        assert!(!fields.contains_key("Apellido"));
    }

    #[test]
    fn test_talent_columns() {
        let req: TalentRequest = serde_json::from_value(json!({
            "nombre": "Luis",
            "buscandoTalento": "Desarrollo",
            "telefono": "+57 300",
            "perfil": "Backend"
        }))
        .unwrap();
        let fields = req.to_fields();

        assert_eq!(fields[SERVICE_COLUMN], "Desarrollo");
        assert_eq!(fields["Phone Number"], "+57 300");
        assert_eq!(fields["Rol buscado"], "Backend");
    }
}
