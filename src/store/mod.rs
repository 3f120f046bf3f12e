//! Persistence handles shared by the user and listing repositories.
//!
//! The repository traits live next to their records (`users::repo`,
//! `listings::repo`); this module owns the connection pool and the error type
//! every repository reports.

#[cfg(test)]
pub mod memory;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("unique constraint violated ({constraint:?})")]
    UniqueViolation { constraint: Option<String> },

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::UniqueViolation {
                    constraint: db.constraint().map(str::to_owned),
                };
            }
        }
        Self::Database(err)
    }
}

/// PostgreSQL-backed store. Every repository call checks a connection out of
/// the pool for the duration of that statement only.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}
