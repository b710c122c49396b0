use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::auth::{require_permission, AuthAccount};
use crate::errors::AppError;
use crate::extract::{Json, Query};
use crate::i18n::Lang;
use crate::jds::handlers::{parse_id, DeleteQuery};
use crate::models::post::{NewPost, Post, PostPatch, PostType};
use crate::posts::repository::{self, PostFilter};
use crate::posts::translation::translate_post;
use crate::slug::slugify;
use crate::state::AppState;

fn post_not_found() -> AppError {
    AppError::not_found("Post not found", "Publicación no encontrada")
}

async fn localize(state: &AppState, post: Post, lang: Lang) -> Result<Post, AppError> {
    if lang != Lang::En {
        return Ok(post);
    }
    translate_post(state.post_translator.as_ref(), post)
        .await
        .map_err(|e| AppError::Translation(e.to_string()))
}

/// POST /posts/create
pub async fn handle_create(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Json(req): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    require_permission(&account, "posts", "create")?;
    req.validate()?;

    if repository::title_taken(&state.db, &req.title, req.post_type).await? {
        return Err(AppError::conflict(
            "A post with this title already exists",
            "Ya existe una publicación con este título",
        ));
    }

    let post = repository::insert(&state.db, &req).await?;
    info!("Post {} ({}) created by {}", post.id, post.post_type, account.email);
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /posts/find
pub async fn handle_find(
    State(state): State<AppState>,
    lang: Lang,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Post>>, AppError> {
    let filter = PostFilter::from_query(&query)?;
    let posts = repository::find(&state.db, &filter).await?;

    let mut localized = Vec::with_capacity(posts.len());
    for post in posts {
        localized.push(localize(&state, post, lang).await?);
    }
    Ok(Json(localized))
}

/// Picks the post whose title slugifies to `slug`.
fn match_slug(posts: Vec<Post>, slug: &str) -> Option<Post> {
    posts.into_iter().find(|post| slugify(&post.title) == slug)
}

/// GET /posts/:type/:slug
pub async fn handle_find_by_slug(
    State(state): State<AppState>,
    lang: Lang,
    Path((segment, slug)): Path<(String, String)>,
) -> Result<Json<Post>, AppError> {
    let post_type = PostType::from_url_segment(&segment);
    let posts = repository::find(&state.db, &PostFilter::Type(post_type)).await?;
    if posts.is_empty() {
        return Err(AppError::not_found(
            "No posts found for this type",
            "No se encontraron publicaciones de este tipo",
        ));
    }

    let post = match_slug(posts, &slug).ok_or_else(post_not_found)?;
    Ok(Json(localize(&state, post, lang).await?))
}

/// PUT /posts/update/:id
pub async fn handle_update(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<String>,
    Json(patch): Json<PostPatch>,
) -> Result<Json<Post>, AppError> {
    require_permission(&account, "posts", "update")?;
    let id = parse_id(&id)?;
    patch.validate()?;

    let post = repository::update(&state.db, id, &patch)
        .await?
        .ok_or_else(post_not_found)?;
    info!("Post {} updated by {}", post.id, account.email);
    Ok(Json(post))
}

/// DELETE /posts/delete/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    require_permission(&account, "posts", "delete")?;
    let id = parse_id(&id)?;

    let found = if query.is_total() {
        repository::delete(&state.db, id).await?
    } else {
        repository::set_archived(&state.db, id, true).await?
    };
    if !found {
        return Err(post_not_found());
    }

    info!("Post {id} removed by {} (total: {})", account.email, query.is_total());
    Ok(Json(repository::find_all(&state.db).await?))
}
