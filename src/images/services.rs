use anyhow::Context;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, DomainError};
use crate::guards::retry_until_unique;
use crate::state::AppState;
use crate::storage::StorageClient;
use crate::users::repo_types::User;

/// Public path prefix pictures are served from.
pub const IMAGES_ENDPOINT: &str = "/images";

pub struct PictureUpload {
    pub body: Bytes,
    pub content_type: String,
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

fn picture_name(username: &str, ext: &str) -> String {
    format!("{}_{}.{}", username, Uuid::new_v4(), ext)
}

/// Object key referenced by a stored picture link.
fn key_from_link(link: &str) -> Option<&str> {
    link.rsplit('/').next().filter(|k| !k.is_empty())
}

/// Accepted pictures are JPEG or PNG no larger than `max_bytes`.
pub fn check_upload(upload: &PictureUpload, max_bytes: u64) -> Result<&'static str, ApiError> {
    if upload.body.len() as u64 > max_bytes {
        return Err(ApiError::validation(format!(
            "File size must not exceed {}MB",
            max_bytes / (1024 * 1024)
        )));
    }
    ext_from_mime(&upload.content_type)
        .ok_or_else(|| ApiError::validation("File type must be either JPEG or PNG"))
}

async fn unique_picture_name(
    storage: &dyn StorageClient,
    username: &str,
    ext: &str,
) -> Result<String, DomainError> {
    retry_until_unique(
        picture_name(username, ext),
        || picture_name(username, ext),
        |name| {
            let name = name.clone();
            async move { storage.exists(&name).await }
        },
    )
    .await
}

async fn remove_picture_file(storage: &dyn StorageClient, user: &User) -> anyhow::Result<()> {
    if let Some(key) = user.profile_picture_link.as_deref().and_then(key_from_link) {
        storage
            .delete_object(key)
            .await
            .with_context(|| format!("delete profile picture {key}"))?;
    }
    Ok(())
}

/// Deletes the current picture (if any), writes the new one, then records
/// the new link. Returns the link.
pub async fn replace_profile_picture(
    st: &AppState,
    user: &mut User,
    upload: PictureUpload,
) -> Result<String, ApiError> {
    let ext = check_upload(&upload, st.config.images.max_size_bytes())?;

    remove_picture_file(st.storage.as_ref(), user)
        .await
        .map_err(DomainError::from)?;

    let name = unique_picture_name(st.storage.as_ref(), &user.username, ext).await?;
    st.storage
        .put_object(&name, upload.body, &upload.content_type)
        .await
        .map_err(DomainError::from)?;

    let link = format!("{IMAGES_ENDPOINT}/{name}");
    user.profile_picture_link = Some(link.clone());
    st.users.update(user).await?;

    info!(user_id = %user.id, %link, "profile picture stored");
    Ok(link)
}

/// Deletes the picture file and clears the link.
pub async fn clear_profile_picture(st: &AppState, user: &mut User) -> Result<(), ApiError> {
    remove_picture_file(st.storage.as_ref(), user)
        .await
        .map_err(DomainError::from)?;
    if user.profile_picture_link.take().is_some() {
        st.users.update(user).await?;
        info!(user_id = %user.id, "profile picture removed");
    }
    Ok(())
}

/// Removes the picture file of an account that is being deleted.
pub async fn discard_profile_picture(st: &AppState, user: &User) -> Result<(), ApiError> {
    remove_picture_file(st.storage.as_ref(), user)
        .await
        .map_err(DomainError::from)?;
    Ok(())
}
