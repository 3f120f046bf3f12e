use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{PictureResponse, UserCreate, UserPrivate, UserPublic, UserUpdate};
use crate::{
    auth::{extractors::CurrentUser, password::hash_password},
    error::{ApiError, DomainError},
    extract::{ApiJson, ApiPath},
    guards::{check_new_user_unique, ensure_unique_id},
    images::services::{
        clear_profile_picture, discard_profile_picture, replace_profile_picture, PictureUpload,
    },
    listings::dto::ListingView,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/me", get(get_me).patch(update_me).delete(delete_me))
        .route("/users/:user_id", get(get_user_public))
}

/// Picture uploads get a body limit a little above the configured maximum so
/// oversized files still reach the size check.
pub fn picture_routes(max_picture_bytes: u64) -> Router<AppState> {
    let limit = usize::try_from(max_picture_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(64 * 1024);
    Router::new()
        .route("/users/me/picture", post(upload_picture).put(replace_picture))
        .layer(DefaultBodyLimit::max(limit))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<UserCreate>,
) -> Result<(StatusCode, [(header::HeaderName, &'static str); 1], Json<UserPrivate>), ApiError> {
    payload.validate()?;

    let hashed_password = hash_password(&payload.password).map_err(DomainError::from)?;
    let mut user = payload.into_user(hashed_password);

    let users = state.users.as_ref();
    check_new_user_unique(users, &user).await?;
    user.id = ensure_unique_id(user.id, |id| users.exists(*id)).await?;
    users.insert(&user).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, "/users/me")],
        Json(UserPrivate::from(&user)),
    ))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserPrivate> {
    Json(UserPrivate::from(&user))
}

#[instrument(skip(state, user, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(mut user): CurrentUser,
    ApiJson(mut payload): ApiJson<UserUpdate>,
) -> Result<Json<UserPrivate>, ApiError> {
    payload.validate()?;

    if let Some(password) = payload.password.take() {
        user.hashed_password = hash_password(&password).map_err(DomainError::from)?;
    }
    payload.apply_to(&mut user);

    state
        .users
        .update(&user)
        .await
        .map_err(ApiError::on_update)?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(UserPrivate::from(&user)))
}

#[instrument(skip(state, user))]
pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    discard_profile_picture(&state, &user).await?;
    state.users.delete(user.id).await?;
    info!(user_id = %user.id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_user_public(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<UserPublic>, ApiError> {
    let user = state
        .users
        .get(user_id)
        .await?
        .ok_or(DomainError::NotFound("User"))?;
    let listings = state
        .listings
        .list_by_author(user.id)
        .await?
        .into_iter()
        .map(ListingView::from)
        .collect();
    Ok(Json(UserPublic::new(user, listings)))
}

async fn read_picture(mp: &mut Multipart) -> Result<Option<PictureUpload>, ApiError> {
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        if body.is_empty() {
            return Ok(None);
        }
        return Ok(Some(PictureUpload { body, content_type }));
    }
    Ok(None)
}

fn picture_created(link: String) -> Response {
    (
        StatusCode::CREATED,
        [(header::LOCATION, link.clone())],
        Json(PictureResponse {
            profile_picture_link: link,
        }),
    )
        .into_response()
}

/// POST /users/me/picture (multipart field `file`)
#[instrument(skip(state, user, mp))]
pub async fn upload_picture(
    State(state): State<AppState>,
    CurrentUser(mut user): CurrentUser,
    mut mp: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_picture(&mut mp)
        .await?
        .ok_or_else(|| ApiError::validation("file is required"))?;
    let link = replace_profile_picture(&state, &mut user, upload).await?;
    Ok(picture_created(link))
}

/// PUT /users/me/picture; without a file the current picture is removed.
#[instrument(skip(state, user, mp))]
pub async fn replace_picture(
    State(state): State<AppState>,
    CurrentUser(mut user): CurrentUser,
    mp: Option<Multipart>,
) -> Result<Response, ApiError> {
    let upload = match mp {
        Some(mut mp) => read_picture(&mut mp).await?,
        None => None,
    };
    match upload {
        Some(upload) => {
            let link = replace_profile_picture(&state, &mut user, upload).await?;
            Ok(picture_created(link))
        }
        None => {
            clear_profile_picture(&state, &mut user).await?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}
