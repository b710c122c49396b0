use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Blog,
    Ebook,
    Social,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Blog => "blog",
            PostType::Ebook => "ebook",
            PostType::Social => "social",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "blog" => Some(PostType::Blog),
            "ebook" => Some(PostType::Ebook),
            "social" => Some(PostType::Social),
            _ => None,
        }
    }

    /// Public URL segment → stored type. Events are social posts; everything else is an ebook.
    pub fn from_url_segment(segment: &str) -> Self {
        if segment == "events" {
            PostType::Social
        } else {
            PostType::Ebook
        }
    }
}

/// A section of a post body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostHeader {
    #[serde(default)]
    pub head: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub section_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub created_by: String,
    #[serde(rename = "type")]
    pub post_type: String,
    pub image: Option<String>,
    pub link: Option<String>,
    pub headers: Json<Vec<PostHeader>>,
    pub archived: bool,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub headers: Vec<PostHeader>,
    #[serde(default)]
    pub archived: bool,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), AppError> {
        if blank(&self.title) {
            return Err(AppError::validation(
                "The post needs a title",
                "La publicación necesita un título",
            ));
        }
        if blank(&self.description) {
            return Err(AppError::validation(
                "The post needs a description",
                "La publicación necesita una descripción",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_by: Option<String>,
    #[serde(rename = "type")]
    pub post_type: Option<PostType>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub headers: Option<Vec<PostHeader>>,
    pub archived: Option<bool>,
}

impl PostPatch {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.as_deref().is_some_and(blank) {
            return Err(AppError::validation(
                "The post needs a title",
                "La publicación necesita un título",
            ));
        }
        if self.description.as_deref().is_some_and(blank) {
            return Err(AppError::validation(
                "The post needs a description",
                "La publicación necesita una descripción",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
pub fn test_post(title: &str, post_type: PostType) -> Post {
    Post {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: "Descripción".to_string(),
        category: "Tecnología".to_string(),
        created_by: "Equipo LinkIT".to_string(),
        post_type: post_type.as_str().to_string(),
        image: None,
        link: None,
        headers: Json(vec![PostHeader {
            head: Some("Introducción".to_string()),
            body: Some("Contenido".to_string()),
            section_image: None,
        }]),
        archived: false,
        created_date: Utc::now(),
    }
}
