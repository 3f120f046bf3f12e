use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginForm, TokenResponse},
        extractors::CurrentUser,
        services,
    },
    error::ApiError,
    extract::ApiForm,
    state::AppState,
};

pub fn token_routes() -> Router<AppState> {
    Router::new().route("/tokens", post(login).delete(logout))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = services::login(state.users.as_ref(), form.username.trim(), &form.password).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

#[instrument(skip(state, user))]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    services::logout(state.users.as_ref(), &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_is_bearer() {
        let json = serde_json::to_value(TokenResponse::bearer("abc".into())).unwrap();
        assert_eq!(json["access_token"], "abc");
        assert_eq!(json["token_type"], "bearer");
    }
}
