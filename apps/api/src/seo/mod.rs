//! Crawler-facing documents: the sitemap and the JD URL export.

pub mod jd_urls;
pub mod sitemap;

use crate::slug::slugify;

/// Public URL of a job offer; the slug is omitted for untitled JDs.
pub fn job_offer_url(base: &str, code: &str, title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("{base}/soyTalento/Joboffer/{code}")
    } else {
        format!("{base}/soyTalento/Joboffer/{code}/{slug}")
    }
}
