pub mod health;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::i18n::localize_errors;
use crate::jds::handlers as jds;
use crate::posts::handlers as posts;
use crate::postulations::handlers as postulations;
use crate::recruiters::handlers as recruiters;
use crate::resources::rate_limit::limit_contact_requests;
use crate::resources::{company_jds, contact, form_config};
use crate::seo::{jd_urls, sitemap};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let contact_routes = Router::new()
        .route("/contact-us", post(contact::handle_contact_us))
        .route("/contact-us/form", post(contact::handle_talent_form))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            limit_contact_requests,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        // Job descriptions
        .route("/jds/create", post(jds::handle_create))
        .route("/jds/find", get(jds::handle_find))
        .route("/jds/update/:id", put(jds::handle_update))
        .route("/jds/delete/:id", delete(jds::handle_delete))
        .route("/jds/sync-airtable", post(jds::handle_sync_airtable))
        .route(
            "/jds/batch-update-status",
            post(jds::handle_batch_update_status),
        )
        .route(
            "/jds/clean-translations",
            post(jds::handle_clean_translations),
        )
        .route(
            "/jds/fix-specific-jd/:code",
            post(jds::handle_fix_specific_jd),
        )
        .route("/jds/translator-check", get(jds::handle_translator_check))
        // Posts
        .route("/posts/create", post(posts::handle_create))
        .route("/posts/find", get(posts::handle_find))
        .route("/posts/update/:id", put(posts::handle_update))
        .route("/posts/delete/:id", delete(posts::handle_delete))
        .route("/posts/:type/:slug", get(posts::handle_find_by_slug))
        // Applications and recruiters
        .route(
            "/postulations",
            get(postulations::handle_find).post(postulations::handle_create),
        )
        .route("/recruiters/payroll", get(recruiters::handle_payroll))
        // Site resources
        .merge(contact_routes)
        .route("/company-jds", get(company_jds::handle_company_jds))
        .route("/form-config", get(form_config::handle_form_config))
        // Accounts
        .route("/auth/register", post(auth::handle_register))
        .route("/auth/login", post(auth::handle_login))
        .route("/auth/verify/:role/:id", get(auth::handle_verify))
        // SEO
        .route("/sitemap.xml", get(sitemap::handle_sitemap))
        .route("/jd-urls", get(jd_urls::handle_jd_urls))
        .layer(middleware::from_fn(localize_errors))
        .with_state(state)
}
