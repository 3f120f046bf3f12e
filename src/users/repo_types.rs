use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,                        // lowercased, unique
    pub username: String,                     // unique
    pub full_name: Option<String>,
    pub birth_date: Date,
    pub postal_code: String,
    pub city: String,
    pub hashed_password: String,              // Argon2 PHC string
    pub session_token: Option<String>,        // unique when set
    pub profile_picture_link: Option<String>,
    pub signup_timestamp: OffsetDateTime,
}
