use axum::{
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::errors::AppError;
use crate::jds::repository::{self as jds, JdFilter};
use crate::models::jd::Jd;
use crate::models::post::{Post, PostType};
use crate::posts::repository as posts;
use crate::seo::job_offer_url;
use crate::slug::slugify;
use crate::state::AppState;

const STATIC_PAGES: [(&str, &str); 10] = [
    ("/", "1.0"),
    ("/ebooks", "0.8"),
    ("/blog", "0.8"),
    ("/soyTalento", "0.9"),
    ("/recursos", "0.9"),
    ("/SoyEmpresa", "0.9"),
    ("/recursos/libreria", "0.9"),
    ("/quienesSomos", "0.9"),
    ("/TermsAndConditions", "0.9"),
    ("/PrivacyPolicy", "0.9"),
];

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn url_entry(out: &mut String, loc: &str, lastmod: DateTime<Utc>, priority: &str, daily: bool) {
    out.push_str("  <url>\n");
    out.push_str(&format!("    <loc>{}</loc>\n", escape_xml(loc)));
    out.push_str(&format!(
        "    <lastmod>{}</lastmod>\n",
        lastmod.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    out.push_str(&format!("    <priority>{priority}</priority>\n"));
    if daily {
        out.push_str("    <changefreq>daily</changefreq>\n");
    }
    out.push_str("  </url>\n");
}

/// Renders the urlset for the static pages and every published document.
pub fn render_sitemap(
    base: &str,
    now: DateTime<Utc>,
    ebooks: &[Post],
    blogs: &[Post],
    jds: &[Jd],
) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(concat!(
        "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\"",
        " xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"",
        " xsi:schemaLocation=\"http://www.sitemaps.org/schemas/sitemap/0.9",
        " http://www.sitemaps.org/schemas/sitemap/0.9/sitemap.xsd\">\n"
    ));

    for (path, priority) in STATIC_PAGES {
        url_entry(&mut xml, &format!("{base}{path}"), now, priority, false);
    }
    for ebook in ebooks.iter().filter(|p| !p.title.trim().is_empty()) {
        let loc = format!("{base}/ebook/{}", slugify(&ebook.title));
        url_entry(&mut xml, &loc, ebook.created_date, "0.7", false);
    }
    for blog in blogs.iter().filter(|p| !p.title.trim().is_empty()) {
        let loc = format!("{base}/blog/{}/{}", blog.id, slugify(&blog.title));
        url_entry(&mut xml, &loc, blog.created_date, "0.7", false);
    }
    for jd in jds
        .iter()
        .filter(|jd| !jd.title.trim().is_empty() && !jd.code.is_empty())
    {
        let loc = job_offer_url(base, &jd.code, &jd.title);
        url_entry(&mut xml, &loc, jd.created_date, "0.8", true);
    }

    xml.push_str("</urlset>\n");
    xml
}

/// GET /sitemap.xml
pub async fn handle_sitemap(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let (ebooks, blogs, jds) = tokio::try_join!(
        posts::find_published(&state.db, PostType::Ebook),
        posts::find_published(&state.db, PostType::Blog),
        jds::find(&state.db, &JdFilter::Archived(false)),
    )
    .map_err(|e| AppError::unexpected(e, "generating the sitemap", "generar el sitemap"))?;

    let xml = render_sitemap(&state.config.public_base_url, Utc::now(), &ebooks, &blogs, &jds);
    info!(
        "Sitemap rendered: {} ebooks, {} blogs, {} JDs",
        ebooks.len(),
        blogs.len(),
        jds.len()
    );

    Ok((
        [
            (CONTENT_TYPE, "application/xml"),
            (CACHE_CONTROL, "public, max-age=1800"),
        ],
        xml,
    ))
}
