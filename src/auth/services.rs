use lazy_static::lazy_static;
use tracing::{debug, error, info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::generate_unique_session_token;
use crate::error::DomainError;
use crate::users::repo::UserRepo;
use crate::users::repo_types::User;

lazy_static! {
    // Verified against when the identifier matches nobody, so that unknown
    // users and wrong passwords cost the same.
    static ref DUMMY_HASH: Option<String> = hash_password("dummy-Passw0rd!").ok();
}

/// Looks the identifier up as username or email and checks the password.
/// Unknown identifier and wrong password fail identically.
pub async fn authenticate(
    users: &dyn UserRepo,
    identifier: &str,
    password: &str,
) -> Result<User, DomainError> {
    let Some(user) = users.find_by_login(identifier).await? else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            verify_password(password, dummy);
        }
        warn!("login with unknown identifier");
        return Err(DomainError::InvalidCredentials);
    };

    if !verify_password(password, &user.hashed_password) {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(DomainError::InvalidCredentials);
    }
    Ok(user)
}

/// Authenticates and returns the caller's session token. A user already
/// logged in gets the same token back.
pub async fn login(
    users: &dyn UserRepo,
    identifier: &str,
    password: &str,
) -> Result<String, DomainError> {
    let user = authenticate(users, identifier, password).await?;

    if let Some(token) = user.session_token {
        debug!(user_id = %user.id, "reusing existing session token");
        return Ok(token);
    }

    let candidate = generate_unique_session_token(move |t| {
        let t = t.clone();
        async move { users.session_token_taken(&t).await }
    })
    .await?;

    // Concurrent logins race here; whichever token landed first wins.
    let token = users
        .claim_session_token(user.id, &candidate)
        .await?
        .ok_or(DomainError::InvalidCredentials)?;

    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

pub async fn logout(users: &dyn UserRepo, user: &User) -> Result<(), DomainError> {
    users.clear_session_token(user.id).await?;
    info!(user_id = %user.id, "user logged out");
    Ok(())
}

/// Maps a bearer token to the single user holding it.
pub async fn resolve_session(users: &dyn UserRepo, token: &str) -> Result<User, DomainError> {
    let mut matches = users.find_by_session_token(token).await?;
    match matches.len() {
        0 => Err(DomainError::Unauthenticated),
        1 => Ok(matches.remove(0)),
        n => {
            let ids: Vec<_> = matches.iter().map(|u| u.id.to_string()).collect();
            error!(count = n, user_ids = ?ids, "session token shared by several users");
            Err(DomainError::InternalConsistency(
                "session token resolves to more than one user".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::RepoError;
    use crate::users::test_support::user_with_password;
    use async_trait::async_trait;
    use uuid::Uuid;

    /// Store wrapper where another login lands a token right after the
    /// caller's snapshot of the user was read.
    struct ConcurrentLogin {
        inner: MemoryStore,
        winner: &'static str,
    }

    #[async_trait]
    impl UserRepo for ConcurrentLogin {
        async fn get(&self, id: Uuid) -> Result<Option<User>, RepoError> {
            UserRepo::get(&self.inner, id).await
        }

        async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
            UserRepo::exists(&self.inner, id).await
        }

        async fn find_by_login(&self, identifier: &str) -> Result<Option<User>, RepoError> {
            let snapshot = self.inner.find_by_login(identifier).await?;
            if let Some(user) = &snapshot {
                self.inner.force_session_token(user.id, self.winner);
            }
            Ok(snapshot)
        }

        async fn find_by_username_or_email(
            &self,
            username: &str,
            email: &str,
        ) -> Result<Vec<User>, RepoError> {
            self.inner.find_by_username_or_email(username, email).await
        }

        async fn find_by_session_token(&self, token: &str) -> Result<Vec<User>, RepoError> {
            self.inner.find_by_session_token(token).await
        }

        async fn session_token_taken(&self, token: &str) -> Result<bool, RepoError> {
            self.inner.session_token_taken(token).await
        }

        async fn insert(&self, user: &User) -> Result<(), RepoError> {
            UserRepo::insert(&self.inner, user).await
        }

        async fn update(&self, user: &User) -> Result<(), RepoError> {
            UserRepo::update(&self.inner, user).await
        }

        async fn claim_session_token(&self, id: Uuid, token: &str) -> Result<Option<String>, RepoError> {
            self.inner.claim_session_token(id, token).await
        }

        async fn clear_session_token(&self, id: Uuid) -> Result<(), RepoError> {
            self.inner.clear_session_token(id).await
        }

        async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
            UserRepo::delete(&self.inner, id).await
        }
    }

    async fn store_with_bob() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let bob = user_with_password("bob1", "b@x.com", "Abc123!@");
        UserRepo::insert(&store, &bob).await.unwrap();
        (store, bob)
    }

    #[tokio::test]
    async fn authenticates_by_username_or_email() {
        let (store, bob) = store_with_bob().await;
        let by_name = authenticate(&store, "bob1", "Abc123!@").await.unwrap();
        let by_email = authenticate(&store, "B@X.com", "Abc123!@").await.unwrap();
        assert_eq!(by_name.id, bob.id);
        assert_eq!(by_email.id, bob.id);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let (store, _) = store_with_bob().await;
        let unknown = authenticate(&store, "nobody", "Abc123!@").await.unwrap_err();
        let wrong = authenticate(&store, "bob1", "Wrong123!@").await.unwrap_err();
        assert!(matches!(unknown, DomainError::InvalidCredentials));
        assert!(matches!(wrong, DomainError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn login_is_idempotent() {
        let (store, _) = store_with_bob().await;
        let first = login(&store, "bob1", "Abc123!@").await.unwrap();
        let second = login(&store, "b@x.com", "Abc123!@").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn claim_keeps_the_first_token() {
        let (store, bob) = store_with_bob().await;
        let first = store.claim_session_token(bob.id, "a").await.unwrap();
        let second = store.claim_session_token(bob.id, "b").await.unwrap();
        assert_eq!(first.as_deref(), Some("a"));
        assert_eq!(second.as_deref(), Some("a"));
        assert!(!store.session_token_taken("b").await.unwrap());
    }

    #[tokio::test]
    async fn claim_for_missing_user_is_none() {
        let store = MemoryStore::new();
        let claimed = store.claim_session_token(Uuid::new_v4(), "a").await.unwrap();
        assert!(claimed.is_none());
    }

    #[tokio::test]
    async fn racing_login_returns_the_token_that_landed_first() {
        let (inner, bob) = store_with_bob().await;
        let store = ConcurrentLogin {
            inner,
            winner: "landed-first",
        };

        let token = login(&store, "bob1", "Abc123!@").await.unwrap();
        assert_eq!(token, "landed-first");
        assert_eq!(resolve_session(&store, &token).await.unwrap().id, bob.id);
    }

    #[tokio::test]
    async fn logout_then_login_issues_a_new_token() {
        let (store, _) = store_with_bob().await;
        let old = login(&store, "bob1", "Abc123!@").await.unwrap();
        let user = resolve_session(&store, &old).await.unwrap();

        logout(&store, &user).await.unwrap();
        logout(&store, &user).await.unwrap();
        assert!(matches!(
            resolve_session(&store, &old).await,
            Err(DomainError::Unauthenticated)
        ));

        let new = login(&store, "bob1", "Abc123!@").await.unwrap();
        assert_ne!(old, new);
        assert_eq!(resolve_session(&store, &new).await.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthenticated() {
        let (store, _) = store_with_bob().await;
        assert!(matches!(
            resolve_session(&store, "nope").await,
            Err(DomainError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn shared_token_is_an_internal_error() {
        let (store, bob) = store_with_bob().await;
        let eve = user_with_password("eve", "e@x.com", "Abc123!@");
        UserRepo::insert(&store, &eve).await.unwrap();
        store.force_session_token(bob.id, "same");
        store.force_session_token(eve.id, "same");

        assert!(matches!(
            resolve_session(&store, "same").await,
            Err(DomainError::InternalConsistency(_))
        ));
    }
}
