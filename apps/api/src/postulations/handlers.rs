use std::collections::HashMap;

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::airtable::{field_text, Fields, ListParams};
use crate::auth::repository as accounts;
use crate::errors::AppError;
use crate::extract::{Json, Query};
use crate::jds::repository as jds;
use crate::mailer::templates;
use crate::models::account::Account;
use crate::models::postulation::Postulation;
use crate::postulations::fields::{application_fields, APPLICATIONS_TABLE};
use crate::recruiters::{find_by_slug, is_active};
use crate::state::AppState;

const WEB_VIEW: &str = "WebView";

#[derive(Debug, Deserialize)]
pub struct CreateQuery {
    pub user: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PostulationCreated {
    Account(Account),
    Message { message: &'static str },
}

/// Resolves `recruiterSlug` to the recruiter's display name.
async fn recruiter_name(state: &AppState, slug: &str) -> Result<String, AppError> {
    let record = find_by_slug(&state.airtable, slug)
        .await
        .map_err(|e| {
            warn!("Recruiter lookup for postulation failed: {e}");
            AppError::validation(
                "Error validating recruiterSlug",
                "Error al validar recruiterSlug",
            )
        })?
        .ok_or_else(|| {
            AppError::validation(
                "Invalid recruiterSlug: recruiter not found",
                "recruiterSlug no válido: recruiter no encontrado",
            )
        })?;

    if !is_active(&record.fields) {
        return Err(AppError::validation(
            "Invalid recruiterSlug: recruiter is not active",
            "recruiterSlug no válido: el recruiter no está activo",
        ));
    }
    Ok(field_text(&record.fields, "Name")
        .map(|n| n.into_owned())
        .unwrap_or_default())
}

/// The applying account, if any. Unknown ids are unauthorized; repeated applications conflict.
async fn applicant(
    state: &AppState,
    user: Option<&str>,
    code: &str,
) -> Result<Option<Account>, AppError> {
    let Some(user) = user else {
        return Ok(None);
    };
    let id = Uuid::parse_str(user).map_err(|_| AppError::Unauthorized)?;
    let account = accounts::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if account.postulations.iter().any(|c| c == code) {
        return Err(AppError::conflict(
            "You have already applied to this JD",
            "Ya te postulaste a esta JD",
        ));
    }
    Ok(Some(account))
}

/// POST /postulations
pub async fn handle_create(
    State(state): State<AppState>,
    Query(query): Query<CreateQuery>,
    Json(postulation): Json<Postulation>,
) -> Result<(StatusCode, Json<PostulationCreated>), AppError> {
    postulation.validate()?;

    let jd = jds::find_by_code(&state.db, postulation.code.trim())
        .await?
        .ok_or_else(|| {
            AppError::not_acceptable(
                "Unable to find JD under the code provided",
                "No se encontro JD con ese codigo",
            )
        })?;

    let user = applicant(&state, query.user.as_deref(), &jd.code).await?;

    let recruiter = match postulation.recruiter_slug() {
        Some(slug) => Some(recruiter_name(&state, slug).await?),
        None => None,
    };

    let fields = application_fields(&postulation, recruiter.as_deref());
    state
        .airtable
        .create_records(APPLICATIONS_TABLE, &[fields])
        .await
        .map_err(|e| AppError::unexpected(e, "creating postulation", "crear postulacion"))?;
    info!("Postulation to {} stored for {}", jd.code, postulation.email);

    let Some(user) = user else {
        return Ok((
            StatusCode::CREATED,
            Json(PostulationCreated::Message {
                message: "Postulation created",
            }),
        ));
    };

    let account = accounts::push_postulation(&state.db, user.id, &jd.code).await?;
    if let Err(e) = state
        .mailer
        .send(templates::postulation_confirmation(&account, &jd))
        .await
    {
        warn!("Postulation confirmation to {} failed: {e}", account.email);
    }

    Ok((StatusCode::CREATED, Json(PostulationCreated::Account(account))))
}

/// Keeps records whose full name contains `user`.
fn filter_by_user(records: Vec<Fields>, user: &str) -> Vec<Fields> {
    records
        .into_iter()
        .filter(|fields| {
            field_text(fields, "Nombre completo").is_some_and(|name| name.contains(user))
        })
        .collect()
}

/// GET /postulations
pub async fn handle_find(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Fields>>, AppError> {
    let mut filters = query.iter().filter(|(k, _)| k.as_str() != "lang");
    let user = match (filters.next(), filters.next()) {
        (None, _) => None,
        (Some((key, value)), None) if key == "user" => Some(value.as_str()),
        _ => return Err(AppError::invalid_filter()),
    };

    let params = ListParams {
        view: Some(WEB_VIEW),
        ..Default::default()
    };
    let records: Vec<Fields> = state
        .airtable
        .list_records(APPLICATIONS_TABLE, &params)
        .await
        .map_err(|e| AppError::unexpected(e, "searching postulations", "buscar postulaciones"))?
        .into_iter()
        .map(|r| r.fields)
        .collect();

    Ok(Json(match user {
        Some(user) => filter_by_user(records, user),
        None => records,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_by_user_substring() {
        let records = vec![
            json!({"Nombre completo": "Ana Pérez"}),
            json!({"Nombre completo": "Juan Ana"}),
            json!({"Nombre": "Sin completo"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();

        let filtered = filter_by_user(records, "Ana");
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_created_message_shape() {
        let body = serde_json::to_value(PostulationCreated::Message {
            message: "Postulation created",
        })
        .unwrap();
        assert_eq!(body, json!({"message": "Postulation created"}));
    }

    mod with_database {
        use super::*;
        use httpmock::prelude::*;
        use sqlx::PgPool;
        use tower::ServiceExt;

        use crate::jds::repository as jd_repository;
        use crate::models::account::Role;
        use crate::models::jd::{JobType, Modality, NewJd};
        use crate::test_support::{body_json, json_request, seed_account, test_app, test_config};

        fn jd(code: &str) -> NewJd {
            NewJd {
                code: code.to_string(),
                title: "Data Engineer".to_string(),
                description: "Pipelines".to_string(),
                job_type: JobType::FullTime,
                location: "Chile".to_string(),
                modality: Modality::Hybrid,
                stack: vec![],
                about_us: String::new(),
                about_client: String::new(),
                responsibilities: vec![],
                requirements: vec!["SQL".to_string()],
                nice_to_have: vec![],
                benefits: vec![],
                company: "Acme".to_string(),
                archived: false,
            }
        }

        fn application(code: &str) -> serde_json::Value {
            json!({
                "code": code,
                "email": "ana@example.com",
                "firstName": "Ana",
                "lastName": "Pérez",
                "cv": "https://cv.example.com/ana.pdf"
            })
        }

        #[sqlx::test]
        async fn test_applicant_records_code_once(pool: PgPool) {
            let server = MockServer::start_async().await;
            let created = server
                .mock_async(|when, then| {
                    when.method(POST).path_contains("Candidate");
                    then.status(200)
                        .json_body(json!({"records": [{"id": "rec1", "fields": {}}]}));
                })
                .await;
            jd_repository::insert(&pool, &jd("LIT-3")).await.unwrap();
            let account =
                seed_account(&pool, Role::User, "ana@example.com", json!({})).await;
            let app = test_app(pool.clone(), &server.base_url(), test_config(&[]));
            let router = app.router();
            let uri = format!("/postulations?user={}", account.id);

            let response = router
                .clone()
                .oneshot(json_request("POST", &uri, None, application("LIT-3")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            assert_eq!(body_json(response).await["postulations"], json!(["LIT-3"]));

            let sent = app.mailer.sent();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].to_email, "ana@example.com");
            assert!(sent[0].subject.contains("Data Engineer"));

            let response = router
                .oneshot(json_request("POST", &uri, None, application("LIT-3")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CONFLICT);

            let stored = accounts::find_by_id(&pool, account.id).await.unwrap().unwrap();
            assert_eq!(stored.postulations, vec!["LIT-3"]);
            created.assert_hits_async(1).await;
        }

        #[sqlx::test]
        async fn test_anonymous_and_unknown_code(pool: PgPool) {
            let server = MockServer::start_async().await;
            let created = server
                .mock_async(|when, then| {
                    when.method(POST).path_contains("Candidate");
                    then.status(200)
                        .json_body(json!({"records": [{"id": "rec1", "fields": {}}]}));
                })
                .await;
            jd_repository::insert(&pool, &jd("LIT-4")).await.unwrap();
            let app = test_app(pool, &server.base_url(), test_config(&[]));
            let router = app.router();

            let response = router
                .clone()
                .oneshot(json_request("POST", "/postulations", None, application(" LIT-4 ")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            assert_eq!(
                body_json(response).await,
                json!({"message": "Postulation created"})
            );
            assert!(app.mailer.sent().is_empty());

            let response = router
                .oneshot(json_request("POST", "/postulations", None, application("LIT-404")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
            created.assert_hits_async(1).await;
        }
    }
}
