use crate::models::post::Post;
use crate::translator::{TranslateError, Translator};

async fn to_english(translator: &dyn Translator, text: &str) -> Result<String, TranslateError> {
    translator.translate(text, "es", "en").await
}

/// Translates a post's text fields and every header. Any failed call fails the whole post.
pub async fn translate_post(
    translator: &dyn Translator,
    mut post: Post,
) -> Result<Post, TranslateError> {
    post.title = to_english(translator, &post.title).await?;
    post.description = to_english(translator, &post.description).await?;
    post.category = to_english(translator, &post.category).await?;
    post.created_by = to_english(translator, &post.created_by).await?;

    for header in post.headers.0.iter_mut() {
        if let Some(head) = header.head.as_mut() {
            *head = to_english(translator, head).await?;
        }
        if let Some(body) = header.body.as_mut() {
            *body = to_english(translator, body).await?;
        }
    }
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::fakes::PrefixTranslator;
    use crate::models::post::{test_post, PostType};

    #[tokio::test]
    async fn test_translates_fields_and_headers() {
        let post = test_post("Guía", PostType::Ebook);
        let translated = translate_post(&PrefixTranslator, post).await.unwrap();

        assert_eq!(translated.title, "EN:Guía");
        assert_eq!(translated.created_by, "EN:Equipo LinkIT");
        assert_eq!(translated.headers.0[0].head.as_deref(), Some("EN:Introducción"));
        assert_eq!(translated.headers.0[0].section_image, None);
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let post = test_post("Guía FAIL", PostType::Blog);
        assert!(translate_post(&PrefixTranslator, post).await.is_err());
    }
}
