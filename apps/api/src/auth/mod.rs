pub mod firebase;
pub mod handlers;
pub mod repository;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::auth::firebase::{bearer_token, AuthError};
use crate::errors::AppError;
use crate::models::account::{Account, Role};
use crate::state::AppState;

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        warn!("Authentication failed: {err}");
        AppError::Unauthorized
    }
}

/// The account behind the request's `Authorization: Bearer <id token>` header.
#[derive(Debug, Clone)]
pub struct AuthAccount(pub Account);

#[async_trait]
impl FromRequestParts<AppState> for AuthAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = bearer_token(header)?;

        let identity = state.verifier.verify(token).await?;
        let email = identity.email.ok_or(AppError::Unauthorized)?;

        let account = repository::find_any_by_email(&state.db, &email)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(AuthAccount(account))
    }
}

/// Only admins whose permission map grants `action` on `resource` (or on `*`) pass.
pub fn require_permission(account: &Account, resource: &str, action: &str) -> Result<(), AppError> {
    let allowed =
        account.role() == Some(Role::Admin) && account.permissions.0.allows(resource, action);
    if allowed {
        Ok(())
    } else {
        warn!(
            "Account {} denied {action} on {resource}",
            account.id
        );
        Err(AppError::Forbidden)
    }
}
