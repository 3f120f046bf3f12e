use async_trait::async_trait;
use uuid::Uuid;

use crate::store::{PgStore, RepoError};
use crate::users::repo_types::User;

const USER_COLUMNS: &str = "id, email, username, full_name, birth_date, postal_code, city, \
     hashed_password, session_token, profile_picture_link, signup_timestamp";

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError>;

    /// Match on username, or on email for the lowercased identifier.
    async fn find_by_login(&self, identifier: &str) -> Result<Option<User>, RepoError>;

    /// Every user holding either the username or the email (at most two).
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Vec<User>, RepoError>;

    /// Users holding this session token. More than one means the token
    /// invariant is broken; at most two rows are returned.
    async fn find_by_session_token(&self, token: &str) -> Result<Vec<User>, RepoError>;

    async fn session_token_taken(&self, token: &str) -> Result<bool, RepoError>;

    async fn insert(&self, user: &User) -> Result<(), RepoError>;

    /// Writes profile fields, password hash and picture link. Session token
    /// and signup timestamp are left alone.
    async fn update(&self, user: &User) -> Result<(), RepoError>;

    /// Stores `token` only if the user has none yet and returns the token the
    /// user holds afterwards. `None` when the user no longer exists.
    async fn claim_session_token(&self, id: Uuid, token: &str) -> Result<Option<String>, RepoError>;

    async fn clear_session_token(&self, id: Uuid) -> Result<(), RepoError>;

    /// Removes the user and, through the foreign key, their listings.
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
impl UserRepo for PgStore {
    async fn get(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool())
            .await?;
        Ok(found)
    }

    async fn find_by_login(&self, identifier: &str) -> Result<Option<User>, RepoError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = lower($1) LIMIT 1"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(identifier)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Vec<User>, RepoError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2 LIMIT 2"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(email)
            .fetch_all(self.pool())
            .await?;
        Ok(users)
    }

    async fn find_by_session_token(&self, token: &str) -> Result<Vec<User>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE session_token = $1 LIMIT 2");
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(token)
            .fetch_all(self.pool())
            .await?;
        Ok(users)
    }

    async fn session_token_taken(&self, token: &str) -> Result<bool, RepoError> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE session_token = $1)")
                .bind(token)
                .fetch_one(self.pool())
                .await?;
        Ok(taken)
    }

    async fn insert(&self, user: &User) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, full_name, birth_date, postal_code, city,
                               hashed_password, session_token, profile_picture_link, signup_timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(user.birth_date)
        .bind(&user.postal_code)
        .bind(&user.city)
        .bind(&user.hashed_password)
        .bind(&user.session_token)
        .bind(&user.profile_picture_link)
        .bind(user.signup_timestamp)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE users
               SET email = $2, username = $3, full_name = $4, birth_date = $5,
                   postal_code = $6, city = $7, hashed_password = $8, profile_picture_link = $9
             WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(user.birth_date)
        .bind(&user.postal_code)
        .bind(&user.city)
        .bind(&user.hashed_password)
        .bind(&user.profile_picture_link)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn claim_session_token(&self, id: Uuid, token: &str) -> Result<Option<String>, RepoError> {
        let stored: Option<Option<String>> = sqlx::query_scalar(
            r#"
            UPDATE users
               SET session_token = COALESCE(session_token, $2)
             WHERE id = $1
            RETURNING session_token
            "#,
        )
        .bind(id)
        .bind(token)
        .fetch_optional(self.pool())
        .await?;
        Ok(stored.flatten())
    }

    async fn clear_session_token(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("UPDATE users SET session_token = NULL WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
