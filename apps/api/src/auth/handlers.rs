use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::repository::{self, NewAccount};
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::extract::Json;
use crate::i18n::Bilingual;
use crate::mailer::templates;
use crate::models::account::{Account, Role};
use crate::models::postulation::looks_like_email;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub role: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub firebase_id: Option<String>,
}

/// Roles that can sign themselves up. Admins are provisioned out of band.
fn registrable_role(raw: &str) -> Option<Role> {
    Role::parse(raw).filter(|r| *r != Role::Admin)
}

/// POST /auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let role = registrable_role(&req.role).ok_or_else(|| {
        AppError::not_acceptable(
            "Entity was not created, role does not exist",
            "La entidad no fue creada, el rol no existe",
        )
    })?;
    if !looks_like_email(&req.email) {
        return Err(AppError::validation(
            "Invalid email address",
            "Dirección de email inválida",
        ));
    }

    let new_account = NewAccount {
        role,
        email: &req.email,
        name: &req.name,
        last_name: req.last_name.as_deref(),
        company_name: req.company_name.as_deref(),
        firebase_id: req.firebase_id.as_deref(),
    };

    let account = repository::insert(&state.db, &new_account)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(
                    "An account with this email already exists",
                    "Ya existe una cuenta con este email",
                )
            } else {
                AppError::Database(e)
            }
        })?;

    info!("Registered {} account {}", role.as_str(), account.id);
    Ok((StatusCode::CREATED, Json(account)))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub token: String,
    pub role: String,
}

fn role_not_found(role: &str) -> AppError {
    AppError::NotFound(Bilingual::new(
        format!("{role} not found, please be sure you are using the right login for your role"),
        format!("{role} no encontrado, asegúrate de usar el inicio de sesión correcto para tu rol"),
    ))
}

/// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Account>, AppError> {
    // Candidates and admins share the user login.
    let candidates: &[Role] = match req.role.as_str() {
        "user" => &[Role::User, Role::Admin],
        "company" => &[Role::Company],
        _ => {
            return Err(AppError::not_acceptable(
                "Provide a valid role for login",
                "Debes brindar un rol válido para iniciar sesión",
            ))
        }
    };

    let identity = state.verifier.verify(&req.token).await?;
    debug!(
        "Login token for uid {} (email verified: {})",
        identity.uid, identity.email_verified
    );
    let email = identity.email.ok_or(AppError::Unauthorized)?;

    let mut found = None;
    for role in candidates {
        if let Some(account) = repository::find_by_email(&state.db, &email, *role).await? {
            found = Some(account);
            break;
        }
    }
    let account = found.ok_or_else(|| role_not_found(&req.role))?;

    let account = if account.active {
        account
    } else {
        info!("Activating account {} on first login", account.id);
        repository::activate(&state.db, account.id).await?
    };
    Ok(Json(account))
}

/// GET /auth/verify/:role/:id
pub async fn handle_verify(
    State(state): State<AppState>,
    Path((role, id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::invalid_id())?;
    let role = Role::parse(&role).ok_or_else(|| {
        AppError::conflict("Role does not exist", "El rol no existe")
    })?;

    let account = repository::find_by_id_and_role(&state.db, id, role)
        .await?
        .ok_or_else(|| AppError::not_found("Account not found", "Cuenta no encontrada"))?;
    let account = repository::activate(&state.db, account.id).await?;

    let welcome = match role {
        Role::User => Some(templates::user_welcome(&account)),
        Role::Company => Some(templates::company_welcome(&account)),
        Role::Admin => None,
    };
    if let Some(email) = welcome {
        if let Err(e) = state.mailer.send(email).await {
            warn!("Welcome email to {} failed: {e}", account.email);
        }
    }

    Ok(Json(json!({ "message": "Completed" })))
}
