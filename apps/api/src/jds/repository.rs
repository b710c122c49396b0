use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::jd::{Jd, JdPatch, JdTranslation, NewJd};

/// The single filter `GET /jds/find` accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum JdFilter {
    All,
    Id(Uuid),
    Code(String),
    Title(String),
    Company(String),
    JobType(String),
    Modality(String),
    Location(String),
    Archived(bool),
}

impl JdFilter {
    /// `lang` is ignored; more than one remaining key, or an unknown one, is rejected.
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, AppError> {
        let mut keys = query.iter().filter(|(k, _)| k.as_str() != "lang");
        let Some((key, value)) = keys.next() else {
            return Ok(JdFilter::All);
        };
        if keys.next().is_some() {
            return Err(AppError::invalid_filter());
        }

        let value = value.clone();
        match key.as_str() {
            "_id" => Uuid::parse_str(&value)
                .map(JdFilter::Id)
                .map_err(|_| AppError::invalid_filter()),
            "code" => Ok(JdFilter::Code(value)),
            "title" => Ok(JdFilter::Title(value)),
            "company" => Ok(JdFilter::Company(value)),
            "type" => Ok(JdFilter::JobType(value)),
            "modality" => Ok(JdFilter::Modality(value)),
            "location" => Ok(JdFilter::Location(value)),
            "archived" => value
                .parse::<bool>()
                .map(JdFilter::Archived)
                .map_err(|_| AppError::invalid_filter()),
            _ => Err(AppError::invalid_filter()),
        }
    }
}

/// `%value%` with LIKE wildcards escaped.
pub(crate) fn contains_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub async fn find(db: &PgPool, filter: &JdFilter) -> Result<Vec<Jd>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM jds");
    match filter {
        JdFilter::All => {}
        JdFilter::Id(id) => {
            qb.push(" WHERE id = ").push_bind(*id);
        }
        JdFilter::Code(code) => {
            qb.push(" WHERE code = ").push_bind(code.clone());
        }
        JdFilter::Title(title) => {
            qb.push(" WHERE title ILIKE ").push_bind(contains_pattern(title));
        }
        JdFilter::Company(company) => {
            qb.push(" WHERE company ILIKE ").push_bind(contains_pattern(company));
        }
        JdFilter::Location(location) => {
            qb.push(" WHERE location ILIKE ").push_bind(contains_pattern(location));
        }
        JdFilter::JobType(job_type) => {
            qb.push(" WHERE job_type = ").push_bind(job_type.clone());
        }
        JdFilter::Modality(modality) => {
            qb.push(" WHERE modality = ").push_bind(modality.clone());
        }
        JdFilter::Archived(archived) => {
            qb.push(" WHERE archived = ").push_bind(*archived);
        }
    }
    qb.push(" ORDER BY created_date DESC");

    qb.build_query_as::<Jd>().fetch_all(db).await
}

pub async fn find_all(db: &PgPool) -> Result<Vec<Jd>, sqlx::Error> {
    find(db, &JdFilter::All).await
}

pub async fn find_by_code(db: &PgPool, code: &str) -> Result<Option<Jd>, sqlx::Error> {
    sqlx::query_as::<_, Jd>("SELECT * FROM jds WHERE code = $1")
        .bind(code)
        .fetch_optional(db)
        .await
}

pub async fn insert(db: &PgPool, jd: &NewJd) -> Result<Jd, sqlx::Error> {
    sqlx::query_as::<_, Jd>(
        r#"
        INSERT INTO jds (id, code, title, description, job_type, location, modality, stack,
                         about_us, about_client, responsibilities, requirements, nice_to_have,
                         benefits, archived, company)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(jd.code.trim())
    .bind(&jd.title)
    .bind(&jd.description)
    .bind(jd.job_type.as_str())
    .bind(&jd.location)
    .bind(jd.modality.as_str())
    .bind(&jd.stack)
    .bind(&jd.about_us)
    .bind(&jd.about_client)
    .bind(&jd.responsibilities)
    .bind(&jd.requirements)
    .bind(&jd.nice_to_have)
    .bind(&jd.benefits)
    .bind(jd.archived)
    .bind(&jd.company)
    .fetch_one(db)
    .await
}

/// Applies a partial update. Changing translatable text drops the stale English copy.
pub async fn update(db: &PgPool, id: Uuid, patch: &JdPatch) -> Result<Option<Jd>, sqlx::Error> {
    sqlx::query_as::<_, Jd>(
        r#"
        UPDATE jds SET
            title            = COALESCE($2, title),
            description      = COALESCE($3, description),
            job_type         = COALESCE($4, job_type),
            location         = COALESCE($5, location),
            modality         = COALESCE($6, modality),
            stack            = COALESCE($7, stack),
            about_us         = COALESCE($8, about_us),
            about_client     = COALESCE($9, about_client),
            responsibilities = COALESCE($10, responsibilities),
            requirements     = COALESCE($11, requirements),
            nice_to_have     = COALESCE($12, nice_to_have),
            benefits         = COALESCE($13, benefits),
            company          = COALESCE($14, company),
            archived         = COALESCE($15, archived),
            en               = CASE WHEN $16 THEN NULL ELSE en END
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(patch.job_type.map(|t| t.as_str()))
    .bind(&patch.location)
    .bind(patch.modality.map(|m| m.as_str()))
    .bind(&patch.stack)
    .bind(&patch.about_us)
    .bind(&patch.about_client)
    .bind(&patch.responsibilities)
    .bind(&patch.requirements)
    .bind(&patch.nice_to_have)
    .bind(&patch.benefits)
    .bind(&patch.company)
    .bind(patch.archived)
    .bind(patch.touches_translatable())
    .fetch_optional(db)
    .await
}

/// Overwrites every synced column except `code` and `archived`.
/// The English copy is dropped when any translated source text changed.
pub async fn replace_synced_fields(db: &PgPool, id: Uuid, jd: &NewJd) -> Result<Jd, sqlx::Error> {
    sqlx::query_as::<_, Jd>(
        r#"
        UPDATE jds SET
            en = CASE
                WHEN title IS DISTINCT FROM $2
                  OR description IS DISTINCT FROM $3
                  OR location IS DISTINCT FROM $5
                  OR stack IS DISTINCT FROM $7
                  OR about_us IS DISTINCT FROM $8
                  OR about_client IS DISTINCT FROM $9
                  OR responsibilities IS DISTINCT FROM $10
                  OR requirements IS DISTINCT FROM $11
                  OR nice_to_have IS DISTINCT FROM $12
                  OR benefits IS DISTINCT FROM $13
                THEN NULL ELSE en END,
            title = $2, description = $3, job_type = $4, location = $5, modality = $6,
            stack = $7, about_us = $8, about_client = $9, responsibilities = $10,
            requirements = $11, nice_to_have = $12, benefits = $13, company = $14
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&jd.title)
    .bind(&jd.description)
    .bind(jd.job_type.as_str())
    .bind(&jd.location)
    .bind(jd.modality.as_str())
    .bind(&jd.stack)
    .bind(&jd.about_us)
    .bind(&jd.about_client)
    .bind(&jd.responsibilities)
    .bind(&jd.requirements)
    .bind(&jd.nice_to_have)
    .bind(&jd.benefits)
    .bind(&jd.company)
    .fetch_one(db)
    .await
}

pub async fn set_archived(db: &PgPool, id: Uuid, archived: bool) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE jds SET archived = $2 WHERE id = $1")
        .bind(id)
        .bind(archived)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM jds WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_translation(
    db: &PgPool,
    id: Uuid,
    translation: &JdTranslation,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE jds SET en = $2 WHERE id = $1")
        .bind(id)
        .bind(Json(translation))
        .execute(db)
        .await?;
    Ok(())
}

pub async fn clear_translations(db: &PgPool, ids: &[Uuid]) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE jds SET en = NULL WHERE id = ANY($1)")
        .bind(ids)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
