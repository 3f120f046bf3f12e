use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::category::ListingCategory;
use super::repo::ListingFilter;
use super::repo_types::{Author, Listing, ListingWithAuthor};
use crate::error::ApiError;

const MAX_TITLE_CHARS: usize = 200;

fn validate_title(title: &str) -> Result<(), ApiError> {
    let len = title.trim().chars().count();
    if len == 0 || len > MAX_TITLE_CHARS {
        return Err(ApiError::validation(format!(
            "Title must be between 1 and {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::validation("Price must be a non-negative number"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ListingCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: ListingCategory,
    #[serde(default)]
    pub price: f64,
}

impl ListingCreate {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_title(&self.title)?;
        validate_price(self.price)
    }

    pub fn into_listing(self, author_id: Uuid) -> Listing {
        let now = OffsetDateTime::now_utc();
        Listing {
            id: Uuid::new_v4(),
            author_id,
            title: self.title,
            description: self.description,
            category: self.category,
            price: self.price,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ListingCategory>,
    pub price: Option<f64>,
}

impl ListingUpdate {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Applies present fields and bumps `updated_at`.
    pub fn apply_to(self, listing: &mut Listing) {
        if let Some(title) = self.title {
            listing.title = title;
        }
        if let Some(description) = self.description {
            listing.description = Some(description);
        }
        if let Some(category) = self.category {
            listing.category = category;
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        listing.updated_at = OffsetDateTime::now_utc();
    }
}

#[derive(Debug, Serialize)]
pub struct ListingView {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: ListingCategory,
    pub price: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Listing> for ListingView {
    fn from(l: Listing) -> Self {
        Self {
            id: l.id,
            author_id: l.author_id,
            title: l.title,
            description: l.description,
            category: l.category,
            price: l.price,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
    pub city: String,
}

impl From<Author> for AuthorView {
    fn from(a: Author) -> Self {
        Self {
            id: a.id,
            username: a.username,
            city: a.city,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingWithAuthorView {
    #[serde(flatten)]
    pub listing: ListingView,
    pub author: AuthorView,
}

impl From<ListingWithAuthor> for ListingWithAuthorView {
    fn from(l: ListingWithAuthor) -> Self {
        Self {
            listing: l.listing.into(),
            author: l.author.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub category: Option<ListingCategory>,
}

fn default_limit() -> i64 {
    32
}

impl ListingQuery {
    pub fn into_filter(self) -> Result<ListingFilter, ApiError> {
        if !(0..1_i64 << 32).contains(&self.offset) {
            return Err(ApiError::validation("offset must be between 0 and 4294967295"));
        }
        if !(1..=256).contains(&self.limit) {
            return Err(ApiError::validation("limit must be between 1 and 256"));
        }
        Ok(ListingFilter {
            offset: self.offset,
            limit: self.limit,
            category: self.category,
        })
    }
}
