mod airtable;
mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod i18n;
mod jds;
mod mailer;
mod models;
mod posts;
mod postulations;
mod recruiters;
mod resources;
mod routes;
mod seo;
mod slug;
mod state;
#[cfg(test)]
mod test_support;
mod translator;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::airtable::AirtableClient;
use crate::auth::firebase::{FirebaseVerifier, GOOGLE_JWKS_URL};
use crate::config::Config;
use crate::db::create_pool;
use crate::mailer::SmtpMailer;
use crate::resources::rate_limit::RateLimiter;
use crate::routes::build_router;
use crate::state::AppState;
use crate::translator::{AzureTranslator, DeeplTranslator};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentHub API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    let airtable = AirtableClient::new(
        &config.airtable_api_url,
        config.airtable_api_key.clone(),
        config.airtable_base_id.clone(),
    );
    info!("Airtable client initialized (base: {})", config.airtable_base_id);

    let post_translator = Arc::new(DeeplTranslator::new(
        &config.deepl_api_url,
        config.deepl_auth_key.clone(),
    ));
    let jd_translator = Arc::new(AzureTranslator::new(
        &config.azure_translator_endpoint,
        config.azure_translator_key.clone(),
        config.azure_translator_region.clone(),
    ));
    info!(
        "Translators initialized (azure region: {})",
        config.azure_translator_region
    );

    let mailer = Arc::new(SmtpMailer::new(
        config.smtp_host.clone(),
        config.smtp_user.clone(),
        config.smtp_pass.clone(),
        &config.mail_from,
        &config.mail_from_name,
    )?);

    let verifier = Arc::new(FirebaseVerifier::new(
        config.firebase_project_id.clone(),
        GOOGLE_JWKS_URL,
    ));

    let contact_limiter = RateLimiter::new(
        config.contact_rate_limit_max,
        Duration::from_secs(config.contact_rate_limit_window_secs),
    );

    // Build app state
    let state = AppState {
        db,
        airtable,
        post_translator,
        jd_translator,
        mailer,
        verifier,
        contact_limiter,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
