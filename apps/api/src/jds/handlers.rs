use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::types::Json as DbJson;
use tracing::{info, warn};
use uuid::Uuid;

use crate::airtable::Fields;
use crate::auth::{require_permission, AuthAccount};
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::extract::{Json, Query};
use crate::i18n::Lang;
use crate::jds::airtable_mapper::jd_from_airtable;
use crate::jds::repository::{self, JdFilter};
use crate::jds::status::{archived_for_status, StatusResult};
use crate::jds::translation::translate_jd;
use crate::jds::check_webhook_secret;
use crate::models::jd::{Jd, JdPatch, NewJd};
use crate::state::AppState;
use crate::translator::{check_translator, TranslatorCheck};

/// JDs translated concurrently during one `find`.
const TRANSLATION_CONCURRENCY: usize = 4;

fn duplicate_code() -> AppError {
    AppError::conflict(
        "A JD with this code already exists",
        "Ya existe una JD con este código",
    )
}

fn jd_not_found() -> AppError {
    AppError::not_found("JD not found", "JD no encontrada")
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::invalid_id())
}

/// POST /jds/create
pub async fn handle_create(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Json(req): Json<NewJd>,
) -> Result<(StatusCode, Json<Jd>), AppError> {
    require_permission(&account, "jds", "create")?;
    req.validate()?;

    let jd = repository::insert(&state.db, &req).await.map_err(|e| {
        if is_unique_violation(&e) {
            duplicate_code()
        } else {
            AppError::Database(e)
        }
    })?;

    info!("JD {} created by {}", jd.code, account.email);
    Ok((StatusCode::CREATED, Json(jd)))
}

/// Persists an English copy for JDs that have none. Failures leave the JD as it was.
async fn with_translation(state: &AppState, jd: Jd) -> Jd {
    if !jd.lacks_translation() {
        return jd;
    }
    let translation = translate_jd(state.jd_translator.as_ref(), &jd).await;
    if let Err(e) = repository::set_translation(&state.db, jd.id, &translation).await {
        warn!("Could not store translation of JD {}: {e}", jd.code);
    }
    Jd {
        en: Some(DbJson(translation)),
        ..jd
    }
}

/// GET /jds/find
pub async fn handle_find(
    State(state): State<AppState>,
    lang: Lang,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Jd>>, AppError> {
    let filter = JdFilter::from_query(&query)?;
    let jds = repository::find(&state.db, &filter).await?;

    if lang != Lang::En {
        return Ok(Json(jds));
    }

    let localized = stream::iter(jds)
        .map(|jd| with_translation(&state, jd))
        .buffered(TRANSLATION_CONCURRENCY)
        .map(|jd| jd.localized(Lang::En))
        .collect::<Vec<_>>()
        .await;
    Ok(Json(localized))
}

/// PUT /jds/update/:id
pub async fn handle_update(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<String>,
    Json(patch): Json<JdPatch>,
) -> Result<Json<Jd>, AppError> {
    require_permission(&account, "jds", "update")?;
    let id = parse_id(&id)?;
    patch.validate()?;

    let jd = repository::update(&state.db, id, &patch)
        .await?
        .ok_or_else(jd_not_found)?;
    info!("JD {} updated by {}", jd.code, account.email);
    Ok(Json(jd))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub total: Option<String>,
}

impl DeleteQuery {
    pub fn is_total(&self) -> bool {
        self.total.as_deref() == Some("true")
    }
}

/// DELETE /jds/delete/:id
/// Archives the JD unless `total=true`; replies with the remaining JDs.
pub async fn handle_delete(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Vec<Jd>>, AppError> {
    require_permission(&account, "jds", "delete")?;
    let id = parse_id(&id)?;

    let found = if query.is_total() {
        repository::delete(&state.db, id).await?
    } else {
        repository::set_archived(&state.db, id, true).await?
    };
    if !found {
        return Err(jd_not_found());
    }

    info!(
        "JD {id} {} by {}",
        if query.is_total() { "deleted" } else { "archived" },
        account.email
    );
    Ok(Json(repository::find_all(&state.db).await?))
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: &'static str,
    pub jd: Jd,
}

/// POST /jds/sync-airtable
pub async fn handle_sync_airtable(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(fields): Json<Fields>,
) -> Result<Json<SyncResponse>, AppError> {
    check_webhook_secret(&headers, state.config.sync_webhook_secret.as_deref())?;

    let mapped = jd_from_airtable(&fields);
    mapped.validate()?;

    let jd = match repository::find_by_code(&state.db, &mapped.code).await? {
        Some(existing) => {
            info!("Updating JD {} from Airtable", existing.code);
            repository::replace_synced_fields(&state.db, existing.id, &mapped).await?
        }
        None => {
            info!("Creating JD {} from Airtable", mapped.code);
            repository::insert(&state.db, &mapped).await?
        }
    };

    Ok(Json(SyncResponse {
        message: "JD synced",
        jd,
    }))
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub message: &'static str,
    pub results: Vec<StatusResult>,
}

fn entry_text(entry: &Value, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// POST /jds/batch-update-status
pub async fn handle_batch_update_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<BatchResponse>, AppError> {
    check_webhook_secret(&headers, state.config.sync_webhook_secret.as_deref())?;

    let Value::Array(updates) = body else {
        return Err(AppError::validation(
            "Payload must be an array",
            "El cuerpo debe ser un arreglo",
        ));
    };

    let mut results = Vec::with_capacity(updates.len());
    for entry in &updates {
        let (Some(code), Some(status)) = (entry_text(entry, "code"), entry_text(entry, "status"))
        else {
            continue;
        };

        let Some(target) = archived_for_status(&status) else {
            results.push(StatusResult::not_mapped(&code));
            continue;
        };

        let Some(existing) = repository::find_by_code(&state.db, &code).await? else {
            results.push(StatusResult::not_found(&code));
            continue;
        };

        let result = StatusResult::compare(&code, existing.archived, target);
        if result.updated {
            repository::set_archived(&state.db, existing.id, target).await?;
        }
        results.push(result);
    }

    info!("Batch status update processed {} entries", results.len());
    Ok(Json(BatchResponse {
        message: "Batch status update complete",
        results,
    }))
}

/// POST /jds/clean-translations
pub async fn handle_clean_translations(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
) -> Result<Json<Value>, AppError> {
    require_permission(&account, "jds", "update")?;

    let stale: Vec<Uuid> = repository::find_all(&state.db)
        .await?
        .iter()
        .filter(|jd| jd.has_untranslated_copy())
        .map(|jd| jd.id)
        .collect();
    let cleaned = repository::clear_translations(&state.db, &stale).await?;

    info!("Cleared {cleaned} untranslated JD copies");
    Ok(Json(json!({
        "message": "Translation cleanup completed",
        "cleaned": cleaned,
    })))
}

/// POST /jds/fix-specific-jd/:code
pub async fn handle_fix_specific_jd(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(code): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_permission(&account, "jds", "update")?;

    let jd = repository::find_by_code(&state.db, &code)
        .await?
        .ok_or_else(jd_not_found)?;

    if !(jd.has_untranslated_copy() || jd.lacks_translation()) {
        return Ok(Json(json!({
            "message": format!("JD {code} already has a valid translation"),
            "retranslated": false,
        })));
    }

    let translation = translate_jd(state.jd_translator.as_ref(), &jd).await;
    repository::set_translation(&state.db, jd.id, &translation).await?;
    info!("Retranslated JD {code}: {} -> {}", jd.title, translation.title);

    Ok(Json(json!({
        "message": format!("JD {code} fixed"),
        "retranslated": true,
        "title": translation.title,
    })))
}

/// GET /jds/translator-check
pub async fn handle_translator_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<TranslatorCheck>) {
    let check = check_translator(
        state.jd_translator.as_ref(),
        &state.config.azure_translator_endpoint,
        &state.config.azure_translator_region,
    )
    .await;
    let status = if check.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_text_accepts_numeric_codes() {
        let entry = json!({"code": 1234, "status": "Won"});
        assert_eq!(entry_text(&entry, "code").as_deref(), Some("1234"));
        assert_eq!(entry_text(&entry, "status").as_deref(), Some("Won"));
        assert_eq!(entry_text(&json!({"code": ""}), "code"), None);
        assert_eq!(entry_text(&json!({"code": null}), "code"), None);
    }

    #[test]
    fn test_delete_query_total_flag() {
        assert!(DeleteQuery {
            total: Some("true".into())
        }
        .is_total());
        assert!(!DeleteQuery {
            total: Some("1".into())
        }
        .is_total());
        assert!(!DeleteQuery::default().is_total());
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("8f2c0a57-1f0b-4c1e-9d65-2f5a7f0b3c11").is_ok());
        assert_eq!(
            parse_id("abc").unwrap_err().status(),
            StatusCode::NOT_ACCEPTABLE
        );
    }

    mod with_database {
        use super::*;
        use axum::body::Body;
        use axum::http::Request;
        use sqlx::PgPool;
        use tower::ServiceExt;

        use crate::models::account::Role;
        use crate::models::jd::{JobType, Modality};
        use crate::test_support::{
            body_json, json_request, seed_account, test_app, test_config, UNREACHABLE,
        };

        const ADMIN: &str = "admin@linkit.com";

        fn new_jd(code: &str, title: &str) -> NewJd {
            NewJd {
                code: code.to_string(),
                title: title.to_string(),
                description: "Rol backend".to_string(),
                job_type: JobType::FullTime,
                location: "Argentina".to_string(),
                modality: Modality::RemoteLocal,
                stack: vec!["Rust".to_string()],
                about_us: String::new(),
                about_client: String::new(),
                responsibilities: vec![],
                requirements: vec!["3 años de experiencia".to_string()],
                nice_to_have: vec![],
                benefits: vec![],
                company: "Acme".to_string(),
                archived: false,
            }
        }

        fn create_body(code: &str) -> Value {
            json!({
                "code": code,
                "title": "Backend Dev",
                "description": "Rol backend",
                "type": "full-time",
                "location": "Argentina",
                "modality": "remote-local",
                "requirements": ["Rust"],
                "company": "Acme"
            })
        }

        #[sqlx::test]
        async fn test_duplicate_code_conflicts(pool: PgPool) {
            seed_account(&pool, Role::Admin, ADMIN, json!({"jds": ["*"]})).await;
            let app = test_app(pool, UNREACHABLE, test_config(&[])).router();

            let response = app
                .clone()
                .oneshot(json_request("POST", "/jds/create", Some(ADMIN), create_body("LIT-1")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            assert_eq!(body_json(response).await["code"], "LIT-1");

            let response = app
                .clone()
                .oneshot(json_request("POST", "/jds/create", Some(ADMIN), create_body("LIT-1")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CONFLICT);

            let mut bad_modality = create_body("LIT-2");
            bad_modality["modality"] = json!("remote");
            let response = app
                .oneshot(json_request("POST", "/jds/create", Some(ADMIN), bad_modality))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
        }

        #[sqlx::test]
        async fn test_create_requires_permission(pool: PgPool) {
            seed_account(&pool, Role::Admin, ADMIN, json!({"posts": ["create"]})).await;
            let app = test_app(pool, UNREACHABLE, test_config(&[])).router();

            let response = app
                .oneshot(json_request("POST", "/jds/create", Some(ADMIN), create_body("LIT-1")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }

        #[sqlx::test]
        async fn test_sync_creates_then_updates_existing(pool: PgPool) {
            let app = test_app(pool.clone(), UNREACHABLE, test_config(&[])).router();
            let record = |code: &str, title: &str| {
                json!({
                    "Recruitment role code": code,
                    "Role Name": title,
                    "Description": "Rol backend",
                    "Buscando talento en": "LATAM",
                    "Requirements": "Rust\nPostgres",
                    "Companies/Roles": [{"id": "rec1", "name": "Acme"}]
                })
            };

            let response = app
                .clone()
                .oneshot(json_request("POST", "/jds/sync-airtable", None, record("LIT-5", "Dev")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let created = body_json(response).await;
            assert_eq!(created["message"], "JD synced");

            let response = app
                .oneshot(json_request(
                    "POST",
                    "/jds/sync-airtable",
                    None,
                    record("  LIT-5 ", "Senior Dev"),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let updated = body_json(response).await;
            assert_eq!(updated["jd"]["_id"], created["jd"]["_id"]);

            let jds = repository::find_all(&pool).await.unwrap();
            assert_eq!(jds.len(), 1);
            assert_eq!(jds[0].title, "Senior Dev");
            assert_eq!(jds[0].requirements, vec!["Rust", "Postgres"]);
        }

        #[sqlx::test]
        async fn test_sync_requires_configured_secret(pool: PgPool) {
            let config = test_config(&[("SYNC_WEBHOOK_SECRET", "s3cret")]);
            let app = test_app(pool, UNREACHABLE, config).router();

            let response = app
                .oneshot(json_request("POST", "/jds/sync-airtable", None, json!({})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        #[sqlx::test]
        async fn test_batch_status_applies_archived(pool: PgPool) {
            repository::insert(&pool, &new_jd("LIT-6", "Dev")).await.unwrap();
            let app = test_app(pool.clone(), UNREACHABLE, test_config(&[])).router();

            let response = app
                .oneshot(json_request(
                    "POST",
                    "/jds/batch-update-status",
                    None,
                    json!([
                        {"code": "LIT-6", "status": "Won"},
                        {"code": "LIT-404", "status": "Lost"},
                        {"code": "LIT-6", "status": "Kickoff"},
                        {"status": "Won"}
                    ]),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let results = body_json(response).await["results"].clone();
            assert_eq!(results.as_array().unwrap().len(), 3);
            assert_eq!(results[0]["updated"], true);
            assert_eq!(results[1]["updated"], false);
            assert_eq!(results[2]["updated"], false);

            let jd = repository::find_by_code(&pool, "LIT-6").await.unwrap().unwrap();
            assert!(jd.archived);
        }

        #[sqlx::test]
        async fn test_delete_archives_unless_total(pool: PgPool) {
            seed_account(&pool, Role::Admin, ADMIN, json!({"jds": ["delete"]})).await;
            let first = repository::insert(&pool, &new_jd("LIT-7", "Dev")).await.unwrap();
            repository::insert(&pool, &new_jd("LIT-8", "QA")).await.unwrap();
            let app = test_app(pool.clone(), UNREACHABLE, test_config(&[])).router();

            let uri = format!("/jds/delete/{}", first.id);
            let response = app
                .clone()
                .oneshot(json_request("DELETE", &uri, Some(ADMIN), json!({})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
            let archived = repository::find_by_code(&pool, "LIT-7").await.unwrap().unwrap();
            assert!(archived.archived);

            let response = app
                .oneshot(json_request(
                    "DELETE",
                    &format!("{uri}?total=true"),
                    Some(ADMIN),
                    json!({}),
                ))
                .await
                .unwrap();
            let remaining = body_json(response).await;
            assert_eq!(remaining.as_array().unwrap().len(), 1);
            assert_eq!(remaining[0]["code"], "LIT-8");
            assert!(repository::find_by_code(&pool, "LIT-7").await.unwrap().is_none());
        }

        #[sqlx::test]
        async fn test_find_in_english_persists_translation(pool: PgPool) {
            repository::insert(&pool, &new_jd("LIT-9", "Desarrollador Backend"))
                .await
                .unwrap();
            let app = test_app(pool.clone(), UNREACHABLE, test_config(&[])).router();

            let response = app
                .clone()
                .oneshot(
                    Request::get("/jds/find?code=LIT-9&lang=en")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let jds = body_json(response).await;
            assert_eq!(jds[0]["title"], "EN:Desarrollador Backend");
            assert_eq!(jds[0]["requirements"][0], "EN:3 años de experiencia");

            let stored = repository::find_by_code(&pool, "LIT-9").await.unwrap().unwrap();
            assert_eq!(stored.title, "Desarrollador Backend");
            assert_eq!(stored.en.unwrap().0.title, "EN:Desarrollador Backend");

            let response = app
                .oneshot(Request::get("/jds/find?code=LIT-9").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(body_json(response).await[0]["title"], "Desarrollador Backend");
        }
    }
}
