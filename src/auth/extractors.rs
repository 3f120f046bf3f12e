use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::{debug, Span};

use super::services::resolve_session;
use crate::error::{ApiError, DomainError};
use crate::state::AppState;
use crate::users::repo_types::User;

/// Caller resolved from `Authorization: Bearer <session token>`.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            debug!("missing or malformed Authorization header");
            DomainError::Unauthenticated
        })?;

        let user = resolve_session(state.users.as_ref(), token).await?;
        Span::current().record("user_id", tracing::field::display(user.id));
        Ok(CurrentUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}
