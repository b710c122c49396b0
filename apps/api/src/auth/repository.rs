use sqlx::PgPool;
use uuid::Uuid;

use crate::models::account::{Account, Role};

pub async fn find_by_email(
    db: &PgPool,
    email: &str,
    role: Role,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT * FROM accounts WHERE lower(email) = lower($1) AND role = $2",
    )
    .bind(email)
    .bind(role.as_str())
    .fetch_optional(db)
    .await
}

/// Any account with this email, regardless of role.
pub async fn find_any_by_email(db: &PgPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE lower(email) = lower($1) LIMIT 1")
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_id_and_role(
    db: &PgPool,
    id: Uuid,
    role: Role,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1 AND role = $2")
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(db)
        .await
}

pub struct NewAccount<'a> {
    pub role: Role,
    pub email: &'a str,
    pub name: &'a str,
    pub last_name: Option<&'a str>,
    pub company_name: Option<&'a str>,
    pub firebase_id: Option<&'a str>,
}

pub async fn insert(db: &PgPool, account: &NewAccount<'_>) -> Result<Account, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (id, role, email, name, last_name, company_name, firebase_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(account.role.as_str())
    .bind(account.email.trim())
    .bind(account.name)
    .bind(account.last_name)
    .bind(account.company_name)
    .bind(account.firebase_id)
    .fetch_one(db)
    .await
}

pub async fn activate(db: &PgPool, id: Uuid) -> Result<Account, sqlx::Error> {
    sqlx::query_as::<_, Account>("UPDATE accounts SET active = TRUE WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_one(db)
        .await
}

/// Records that the account applied to the JD `code`.
pub async fn push_postulation(db: &PgPool, id: Uuid, code: &str) -> Result<Account, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "UPDATE accounts SET postulations = array_append(postulations, $2) WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(code)
    .fetch_one(db)
    .await
}
