use async_trait::async_trait;
use uuid::Uuid;

use crate::listings::category::ListingCategory;
use crate::listings::repo_types::{Listing, ListingRow, ListingWithAuthor, ListingWithAuthorRow};
use crate::store::{PgStore, RepoError};

const LISTING_COLUMNS: &str =
    "l.id, l.author_id, l.title, l.description, l.category, l.price, l.created_at, l.updated_at";

#[derive(Debug, Clone)]
pub struct ListingFilter {
    pub offset: i64,
    pub limit: i64,
    pub category: Option<ListingCategory>,
}

#[async_trait]
pub trait ListingRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Listing>, RepoError>;

    async fn get_with_author(&self, id: Uuid) -> Result<Option<ListingWithAuthor>, RepoError>;

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError>;

    /// Newest first.
    async fn list(&self, filter: &ListingFilter) -> Result<Vec<ListingWithAuthor>, RepoError>;

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Listing>, RepoError>;

    async fn insert(&self, listing: &Listing) -> Result<(), RepoError>;

    async fn update(&self, listing: &Listing) -> Result<(), RepoError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

fn into_listings(rows: Vec<ListingRow>) -> Result<Vec<Listing>, RepoError> {
    rows.into_iter().map(Listing::try_from).collect()
}

#[async_trait]
impl ListingRepo for PgStore {
    async fn get(&self, id: Uuid) -> Result<Option<Listing>, RepoError> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings l WHERE l.id = $1");
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        row.map(Listing::try_from).transpose()
    }

    async fn get_with_author(&self, id: Uuid) -> Result<Option<ListingWithAuthor>, RepoError> {
        let sql = format!(
            r#"
            SELECT {LISTING_COLUMNS}, u.username AS author_username, u.city AS author_city
              FROM listings l
              JOIN users u ON u.id = l.author_id
             WHERE l.id = $1
            "#
        );
        let row = sqlx::query_as::<_, ListingWithAuthorRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        row.map(ListingWithAuthor::try_from).transpose()
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM listings WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool())
                .await?;
        Ok(found)
    }

    async fn list(&self, filter: &ListingFilter) -> Result<Vec<ListingWithAuthor>, RepoError> {
        let sql = format!(
            r#"
            SELECT {LISTING_COLUMNS}, u.username AS author_username, u.city AS author_city
              FROM listings l
              JOIN users u ON u.id = l.author_id
             WHERE ($1::TEXT IS NULL OR l.category = $1)
             ORDER BY l.created_at DESC, l.id
             LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, ListingWithAuthorRow>(&sql)
            .bind(filter.category.map(ListingCategory::as_str))
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool())
            .await?;
        rows.into_iter().map(ListingWithAuthor::try_from).collect()
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Listing>, RepoError> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings l WHERE l.author_id = $1 ORDER BY l.created_at DESC"
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(author_id)
            .fetch_all(self.pool())
            .await?;
        into_listings(rows)
    }

    async fn insert(&self, listing: &Listing) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO listings (id, author_id, title, description, category, price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(listing.id)
        .bind(listing.author_id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.category.as_str())
        .bind(listing.price)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn update(&self, listing: &Listing) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE listings
               SET title = $2, description = $3, category = $4, price = $5, updated_at = $6
             WHERE id = $1
            "#,
        )
        .bind(listing.id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.category.as_str())
        .bind(listing.price)
        .bind(listing.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
