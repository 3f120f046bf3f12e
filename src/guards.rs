//! Uniqueness and ownership checks applied before records are written.

use std::future::Future;

use tracing::warn;
use uuid::Uuid;

use crate::error::{ConflictField, DomainError};
use crate::store::RepoError;
use crate::users::repo::UserRepo;
use crate::users::repo_types::User;

/// Regeneration attempts before giving up on finding an unused value.
pub const MAX_UNIQUE_ATTEMPTS: usize = 32;

/// Returns `candidate` if `is_taken` says it is free, otherwise keeps
/// regenerating until a free value turns up or the attempts run out.
pub async fn retry_until_unique<T, E, G, F, Fut>(
    mut candidate: T,
    mut regenerate: G,
    mut is_taken: F,
) -> Result<T, DomainError>
where
    DomainError: From<E>,
    G: FnMut() -> T,
    F: FnMut(&T) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    for attempt in 1..=MAX_UNIQUE_ATTEMPTS {
        if !is_taken(&candidate).await? {
            return Ok(candidate);
        }
        warn!(attempt, "generated value already in use, regenerating");
        candidate = regenerate();
    }
    Err(DomainError::InternalConsistency(format!(
        "no unused value after {MAX_UNIQUE_ATTEMPTS} attempts"
    )))
}

/// Keeps `candidate` unless another record already uses it.
pub async fn ensure_unique_id<F, Fut>(candidate: Uuid, exists: F) -> Result<Uuid, DomainError>
where
    F: FnMut(&Uuid) -> Fut,
    Fut: Future<Output = Result<bool, RepoError>>,
{
    retry_until_unique(candidate, Uuid::new_v4, exists).await
}

/// Rejects a registration whose username or email is already held. A taken
/// username is reported before a taken email.
pub async fn check_new_user_unique(users: &dyn UserRepo, candidate: &User) -> Result<(), DomainError> {
    let existing = users
        .find_by_username_or_email(&candidate.username, &candidate.email)
        .await?;
    if existing.iter().any(|u| u.username == candidate.username) {
        return Err(DomainError::Conflict(ConflictField::Username));
    }
    if !existing.is_empty() {
        return Err(DomainError::Conflict(ConflictField::Email));
    }
    Ok(())
}

pub fn verify_owner(owner_id: Uuid, actor_id: Uuid) -> Result<(), DomainError> {
    if owner_id != actor_id {
        warn!(%owner_id, %actor_id, "caller does not own resource");
        return Err(DomainError::Forbidden);
    }
    Ok(())
}
