//! In-memory store for tests. Enforces the same unique constraints and
//! cascade as the PostgreSQL schema.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::listings::repo::{ListingFilter, ListingRepo};
use crate::listings::repo_types::{Author, Listing, ListingWithAuthor};
use crate::store::RepoError;
use crate::users::repo::UserRepo;
use crate::users::repo_types::User;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    listings: HashMap<Uuid, Listing>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Test hook: writes a token straight into a record, bypassing the
    /// unique constraint.
    pub fn force_session_token(&self, id: Uuid, token: &str) {
        if let Some(user) = self.tables().users.get_mut(&id) {
            user.session_token = Some(token.to_string());
        }
    }
}

fn violation(constraint: &str) -> RepoError {
    RepoError::UniqueViolation {
        constraint: Some(constraint.to_string()),
    }
}

fn check_user_constraints(tables: &Tables, user: &User) -> Result<(), RepoError> {
    for other in tables.users.values().filter(|u| u.id != user.id) {
        if other.email == user.email {
            return Err(violation("users_email_key"));
        }
        if other.username == user.username {
            return Err(violation("users_username_key"));
        }
        if other.session_token.is_some() && other.session_token == user.session_token {
            return Err(violation("users_session_token_key"));
        }
    }
    Ok(())
}

fn with_author(tables: &Tables, listing: &Listing) -> Option<ListingWithAuthor> {
    let user = tables.users.get(&listing.author_id)?;
    Some(ListingWithAuthor {
        listing: listing.clone(),
        author: Author {
            id: user.id,
            username: user.username.clone(),
            city: user.city.clone(),
        },
    })
}

fn newest_first(a: &Listing, b: &Listing) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id))
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.tables().users.contains_key(&id))
    }

    async fn find_by_login(&self, identifier: &str) -> Result<Option<User>, RepoError> {
        let email = identifier.to_lowercase();
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.username == identifier || u.email == email)
            .cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Vec<User>, RepoError> {
        Ok(self
            .tables()
            .users
            .values()
            .filter(|u| u.username == username || u.email == email)
            .take(2)
            .cloned()
            .collect())
    }

    async fn find_by_session_token(&self, token: &str) -> Result<Vec<User>, RepoError> {
        Ok(self
            .tables()
            .users
            .values()
            .filter(|u| u.session_token.as_deref() == Some(token))
            .take(2)
            .cloned()
            .collect())
    }

    async fn session_token_taken(&self, token: &str) -> Result<bool, RepoError> {
        Ok(self
            .tables()
            .users
            .values()
            .any(|u| u.session_token.as_deref() == Some(token)))
    }

    async fn insert(&self, user: &User) -> Result<(), RepoError> {
        let mut tables = self.tables();
        if tables.users.contains_key(&user.id) {
            return Err(violation("users_pkey"));
        }
        check_user_constraints(&tables, user)?;
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), RepoError> {
        let mut tables = self.tables();
        let Some(current) = tables.users.get(&user.id).cloned() else {
            return Ok(());
        };
        let updated = User {
            session_token: current.session_token,
            signup_timestamp: current.signup_timestamp,
            ..user.clone()
        };
        check_user_constraints(&tables, &updated)?;
        tables.users.insert(updated.id, updated);
        Ok(())
    }

    async fn claim_session_token(&self, id: Uuid, token: &str) -> Result<Option<String>, RepoError> {
        let mut tables = self.tables();
        let taken = tables
            .users
            .values()
            .any(|u| u.id != id && u.session_token.as_deref() == Some(token));
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if user.session_token.is_none() {
            if taken {
                return Err(violation("users_session_token_key"));
            }
            user.session_token = Some(token.to_string());
        }
        Ok(user.session_token.clone())
    }

    async fn clear_session_token(&self, id: Uuid) -> Result<(), RepoError> {
        if let Some(user) = self.tables().users.get_mut(&id) {
            user.session_token = None;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables();
        let removed = tables.users.remove(&id).is_some();
        if removed {
            tables.listings.retain(|_, l| l.author_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl ListingRepo for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<Listing>, RepoError> {
        Ok(self.tables().listings.get(&id).cloned())
    }

    async fn get_with_author(&self, id: Uuid) -> Result<Option<ListingWithAuthor>, RepoError> {
        let tables = self.tables();
        Ok(tables
            .listings
            .get(&id)
            .and_then(|l| with_author(&tables, l)))
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.tables().listings.contains_key(&id))
    }

    async fn list(&self, filter: &ListingFilter) -> Result<Vec<ListingWithAuthor>, RepoError> {
        let tables = self.tables();
        let mut listings: Vec<&Listing> = tables
            .listings
            .values()
            .filter(|l| filter.category.map_or(true, |c| l.category == c))
            .collect();
        listings.sort_by(|a, b| newest_first(a, b));
        Ok(listings
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .filter_map(|l| with_author(&tables, l))
            .collect())
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Listing>, RepoError> {
        let mut listings: Vec<Listing> = self
            .tables()
            .listings
            .values()
            .filter(|l| l.author_id == author_id)
            .cloned()
            .collect();
        listings.sort_by(newest_first);
        Ok(listings)
    }

    async fn insert(&self, listing: &Listing) -> Result<(), RepoError> {
        let mut tables = self.tables();
        if tables.listings.contains_key(&listing.id) {
            return Err(violation("listings_pkey"));
        }
        if !tables.users.contains_key(&listing.author_id) {
            return Err(RepoError::Corrupt(format!(
                "author {} does not exist",
                listing.author_id
            )));
        }
        tables.listings.insert(listing.id, listing.clone());
        Ok(())
    }

    async fn update(&self, listing: &Listing) -> Result<(), RepoError> {
        let mut tables = self.tables();
        if let Some(current) = tables.listings.get_mut(&listing.id) {
            *current = Listing {
                author_id: current.author_id,
                created_at: current.created_at,
                ..listing.clone()
            };
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.tables().listings.remove(&id).is_some())
    }
}
