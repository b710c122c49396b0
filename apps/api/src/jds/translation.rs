use futures::future::join_all;
use tracing::info;

use crate::models::jd::{Jd, JdTranslation};
use crate::translator::{translate_or_keep, Translator};

async fn translate_all(translator: &dyn Translator, items: &[String]) -> Vec<String> {
    join_all(items.iter().map(|item| translate_or_keep(translator, item))).await
}

/// English copy of every translatable JD field. Failed fields keep their Spanish text.
pub async fn translate_jd(translator: &dyn Translator, jd: &Jd) -> JdTranslation {
    info!("Translating JD {} to English", jd.code);

    let (title, description, location, about_us, about_client) = tokio::join!(
        translate_or_keep(translator, &jd.title),
        translate_or_keep(translator, &jd.description),
        translate_or_keep(translator, &jd.location),
        translate_or_keep(translator, &jd.about_us),
        translate_or_keep(translator, &jd.about_client),
    );
    let (stack, responsibilities, requirements, nice_to_have, benefits) = tokio::join!(
        translate_all(translator, &jd.stack),
        translate_all(translator, &jd.responsibilities),
        translate_all(translator, &jd.requirements),
        translate_all(translator, &jd.nice_to_have),
        translate_all(translator, &jd.benefits),
    );

    JdTranslation {
        title,
        description,
        location,
        modality: String::new(),
        stack,
        about_us,
        about_client,
        responsibilities,
        requirements,
        nice_to_have,
        benefits,
    }
}
