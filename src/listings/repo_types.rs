use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::listings::category::{ListingCategory, UnknownCategory};
use crate::store::RepoError;

/// Listing record.
#[derive(Debug, Clone)]
pub struct Listing {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: ListingCategory,
    pub price: f64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Public identity shown next to a listing.
#[derive(Debug, Clone)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
    pub city: String,
}

#[derive(Debug, Clone)]
pub struct ListingWithAuthor {
    pub listing: Listing,
    pub author: Author,
}

#[derive(Debug, FromRow)]
pub struct ListingRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub price: f64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct ListingWithAuthorRow {
    #[sqlx(flatten)]
    pub listing: ListingRow,
    pub author_username: String,
    pub author_city: String,
}

impl TryFrom<ListingRow> for Listing {
    type Error = RepoError;

    fn try_from(r: ListingRow) -> Result<Self, Self::Error> {
        let category = r
            .category
            .parse()
            .map_err(|e: UnknownCategory| RepoError::Corrupt(e.to_string()))?;
        Ok(Self {
            id: r.id,
            author_id: r.author_id,
            title: r.title,
            description: r.description,
            category,
            price: r.price,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

impl TryFrom<ListingWithAuthorRow> for ListingWithAuthor {
    type Error = RepoError;

    fn try_from(r: ListingWithAuthorRow) -> Result<Self, Self::Error> {
        let listing = Listing::try_from(r.listing)?;
        Ok(Self {
            author: Author {
                id: listing.author_id,
                username: r.author_username,
                city: r.author_city,
            },
            listing,
        })
    }
}
