use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::jds::repository as jds;
use crate::models::jd::Jd;
use crate::seo::job_offer_url;
use crate::state::AppState;

/// `Job Code,JD URL` rows for every JD.
pub fn render_csv(base: &str, jds: &[Jd]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Job Code", "JD URL"])?;
    for jd in jds {
        let url = job_offer_url(base, &jd.code, &jd.title);
        writer.write_record([jd.code.as_str(), url.as_str()])?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// GET /jd-urls
pub async fn handle_jd_urls(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let jds = jds::find_all(&state.db)
        .await
        .map_err(|e| AppError::unexpected(e, "generating the URL list", "generar la lista de URLs"))?;
    let body = render_csv(&state.config.public_base_url, &jds)?;

    let file_name = format!("jd-urls-{}.csv", Utc::now().format("%Y-%m-%dT%H-%M-%S"));
    info!("Exported {} JD URLs as {file_name}", jds.len());

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename={file_name}")),
        ],
        body,
    ))
}
