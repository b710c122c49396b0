use std::sync::Arc;

use sqlx::PgPool;

use crate::airtable::AirtableClient;
use crate::auth::firebase::TokenVerifier;
use crate::config::Config;
use crate::mailer::Mailer;
use crate::resources::rate_limit::RateLimiter;
use crate::translator::Translator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub airtable: AirtableClient,
    /// DeepL; translates posts.
    pub post_translator: Arc<dyn Translator>,
    /// Azure Translator; translates JDs.
    pub jd_translator: Arc<dyn Translator>,
    pub mailer: Arc<dyn Mailer>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub contact_limiter: RateLimiter,
    pub config: Config,
}
