//! Shared fixtures for router-level tests.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::airtable::AirtableClient;
use crate::auth::firebase::fakes::EmailTokenVerifier;
use crate::auth::repository::{self as accounts, NewAccount};
use crate::config::Config;
use crate::mailer::fakes::RecordingMailer;
use crate::models::account::{Account, Permissions, Role};
use crate::resources::rate_limit::RateLimiter;
use crate::routes::build_router;
use crate::state::AppState;
use crate::translator::fakes::PrefixTranslator;

pub const UNREACHABLE: &str = "http://127.0.0.1:9";

pub struct TestApp {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }
}

pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    Config::from_lookup(|key| {
        if let Some((_, value)) = overrides.iter().find(|(k, _)| *k == key) {
            return Some(value.to_string());
        }
        match key {
            "PORT" => Some("8080".to_string()),
            "CONTACT_RATE_LIMIT_MAX" => Some("2".to_string()),
            "CONTACT_RATE_LIMIT_WINDOW_SECS" => Some("900".to_string()),
            "TRUST_PROXY" | "SYNC_WEBHOOK_SECRET" => None,
            "MAIL_FROM" => Some("noreply@example.com".to_string()),
            "DATABASE_URL" => Some("postgres://localhost/talenthub".to_string()),
            _ => Some("test".to_string()),
        }
    })
    .unwrap()
}

/// A pool that never connects; for paths that fail before touching the database.
pub fn lazy_pool() -> PgPool {
    PgPool::connect_lazy("postgres://localhost/talenthub").unwrap()
}

pub fn test_app(db: PgPool, airtable_url: &str, config: Config) -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState {
        db,
        airtable: AirtableClient::new(airtable_url, "key".into(), "appTest".into()),
        post_translator: Arc::new(PrefixTranslator),
        jd_translator: Arc::new(PrefixTranslator),
        mailer: mailer.clone(),
        verifier: Arc::new(EmailTokenVerifier),
        contact_limiter: RateLimiter::new(
            config.contact_rate_limit_max,
            Duration::from_secs(config.contact_rate_limit_window_secs),
        ),
        config,
    };
    TestApp { state, mailer }
}

/// An active account; admins get `permissions`.
pub async fn seed_account(db: &PgPool, role: Role, email: &str, permissions: Value) -> Account {
    let account = accounts::insert(
        db,
        &NewAccount {
            role,
            email,
            name: "Ana",
            last_name: Some("Pérez"),
            company_name: None,
            firebase_id: None,
        },
    )
    .await
    .unwrap();
    let permissions: Permissions = serde_json::from_value(permissions).unwrap();
    sqlx::query_as::<_, Account>(
        "UPDATE accounts SET active = TRUE, permissions = $2 WHERE id = $1 RETURNING *",
    )
    .bind(account.id)
    .bind(Json(permissions))
    .fetch_one(db)
    .await
    .unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
