use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::User;
use super::validation::{
    validate_birth_date, validate_city, validate_email, validate_full_name, validate_password,
    validate_postal_code, validate_username,
};
use crate::error::ApiError;
use crate::listings::dto::ListingView;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(with = "iso_date")]
    pub birth_date: Date,
    pub postal_code: String,
    pub city: String,
}

impl UserCreate {
    /// Trims and lowercases the email, then checks every field.
    pub fn validate(&mut self) -> Result<(), ApiError> {
        self.email = self.email.trim().to_lowercase();
        validate_email(&self.email)?;
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        if let Some(full_name) = &self.full_name {
            validate_full_name(full_name)?;
        }
        validate_birth_date(self.birth_date)?;
        validate_postal_code(&self.postal_code)?;
        validate_city(&self.city)?;
        Ok(())
    }

    pub fn into_user(self, hashed_password: String) -> User {
        User {
            id: Uuid::new_v4(),
            email: self.email,
            username: self.username,
            full_name: self.full_name,
            birth_date: self.birth_date,
            postal_code: self.postal_code,
            city: self.city,
            hashed_password,
            session_token: None,
            profile_picture_link: None,
            signup_timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Partial profile update; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub birth_date: Option<Date>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

impl UserUpdate {
    pub fn validate(&mut self) -> Result<(), ApiError> {
        if let Some(email) = self.email.as_mut() {
            *email = email.trim().to_lowercase();
            validate_email(email)?;
        }
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        if let Some(full_name) = &self.full_name {
            validate_full_name(full_name)?;
        }
        if let Some(birth_date) = self.birth_date {
            validate_birth_date(birth_date)?;
        }
        if let Some(postal_code) = &self.postal_code {
            validate_postal_code(postal_code)?;
        }
        if let Some(city) = &self.city {
            validate_city(city)?;
        }
        Ok(())
    }

    /// Copies the profile fields onto `user`. The password is handled by the
    /// caller since it has to be hashed first.
    pub fn apply_to(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(full_name) = self.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(birth_date) = self.birth_date {
            user.birth_date = birth_date;
        }
        if let Some(postal_code) = self.postal_code {
            user.postal_code = postal_code;
        }
        if let Some(city) = self.city {
            user.city = city;
        }
    }
}

/// Everything the owner may see about their own account.
#[derive(Debug, Serialize)]
pub struct UserPrivate {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    #[serde(with = "iso_date")]
    pub birth_date: Date,
    pub postal_code: String,
    pub city: String,
    pub profile_picture_link: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub signup_timestamp: OffsetDateTime,
}

impl From<&User> for UserPrivate {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            username: u.username.clone(),
            full_name: u.full_name.clone(),
            birth_date: u.birth_date,
            postal_code: u.postal_code.clone(),
            city: u.city.clone(),
            profile_picture_link: u.profile_picture_link.clone(),
            signup_timestamp: u.signup_timestamp,
        }
    }
}

/// Profile visible to anyone, with the user's listings.
#[derive(Debug, Serialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub city: String,
    pub profile_picture_link: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub signup_timestamp: OffsetDateTime,
    pub listings: Vec<ListingView>,
}

impl UserPublic {
    pub fn new(u: User, listings: Vec<ListingView>) -> Self {
        Self {
            id: u.id,
            username: u.username,
            full_name: u.full_name,
            city: u.city,
            profile_picture_link: u.profile_picture_link,
            signup_timestamp: u.signup_timestamp,
            listings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PictureResponse {
    pub profile_picture_link: String,
}
