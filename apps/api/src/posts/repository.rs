use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jds::repository::contains_pattern;
use crate::models::post::{NewPost, Post, PostPatch, PostType};

#[derive(Debug, Clone, PartialEq)]
pub enum PostFilter {
    All,
    Id(Uuid),
    Type(PostType),
    Title(String),
    Category(String),
    Archived(bool),
}

impl PostFilter {
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, AppError> {
        let mut keys = query.iter().filter(|(k, _)| k.as_str() != "lang");
        let Some((key, value)) = keys.next() else {
            return Ok(PostFilter::All);
        };
        if keys.next().is_some() {
            return Err(AppError::invalid_filter());
        }

        match key.as_str() {
            "_id" => Uuid::parse_str(value)
                .map(PostFilter::Id)
                .map_err(|_| AppError::invalid_filter()),
            "type" => PostType::parse(value)
                .map(PostFilter::Type)
                .ok_or_else(AppError::invalid_filter),
            "title" => Ok(PostFilter::Title(value.clone())),
            "category" => Ok(PostFilter::Category(value.clone())),
            "archived" => value
                .parse::<bool>()
                .map(PostFilter::Archived)
                .map_err(|_| AppError::invalid_filter()),
            _ => Err(AppError::invalid_filter()),
        }
    }
}

pub async fn find(db: &PgPool, filter: &PostFilter) -> Result<Vec<Post>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM posts");
    match filter {
        PostFilter::All => {}
        PostFilter::Id(id) => {
            qb.push(" WHERE id = ").push_bind(*id);
        }
        PostFilter::Type(post_type) => {
            qb.push(" WHERE post_type = ").push_bind(post_type.as_str());
        }
        PostFilter::Title(title) => {
            qb.push(" WHERE title ILIKE ").push_bind(contains_pattern(title));
        }
        PostFilter::Category(category) => {
            qb.push(" WHERE category ILIKE ").push_bind(contains_pattern(category));
        }
        PostFilter::Archived(archived) => {
            qb.push(" WHERE archived = ").push_bind(*archived);
        }
    }
    qb.push(" ORDER BY created_date DESC");

    qb.build_query_as::<Post>().fetch_all(db).await
}

pub async fn find_all(db: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
    find(db, &PostFilter::All).await
}

/// Non-archived posts of one type, newest first.
pub async fn find_published(db: &PgPool, post_type: PostType) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        "SELECT * FROM posts WHERE post_type = $1 AND archived = FALSE ORDER BY created_date DESC",
    )
    .bind(post_type.as_str())
    .fetch_all(db)
    .await
}

pub async fn title_taken(
    db: &PgPool,
    title: &str,
    post_type: PostType,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM posts WHERE lower(title) = lower($1) AND post_type = $2)",
    )
    .bind(title.trim())
    .bind(post_type.as_str())
    .fetch_one(db)
    .await
}

pub async fn insert(db: &PgPool, post: &NewPost) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (id, title, description, category, created_by, post_type, image, link,
                           headers, archived)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(post.title.trim())
    .bind(&post.description)
    .bind(&post.category)
    .bind(&post.created_by)
    .bind(post.post_type.as_str())
    .bind(&post.image)
    .bind(&post.link)
    .bind(Json(&post.headers))
    .bind(post.archived)
    .fetch_one(db)
    .await
}

pub async fn update(db: &PgPool, id: Uuid, patch: &PostPatch) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts SET
            title       = COALESCE($2, title),
            description = COALESCE($3, description),
            category    = COALESCE($4, category),
            created_by  = COALESCE($5, created_by),
            post_type   = COALESCE($6, post_type),
            image       = COALESCE($7, image),
            link        = COALESCE($8, link),
            headers     = COALESCE($9, headers),
            archived    = COALESCE($10, archived)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(&patch.category)
    .bind(&patch.created_by)
    .bind(patch.post_type.map(|t| t.as_str()))
    .bind(&patch.image)
    .bind(&patch.link)
    .bind(patch.headers.as_ref().map(Json))
    .bind(patch.archived)
    .fetch_optional(db)
    .await
}

pub async fn set_archived(db: &PgPool, id: Uuid, archived: bool) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE posts SET archived = $2 WHERE id = $1")
        .bind(id)
        .bind(archived)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
