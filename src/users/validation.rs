use lazy_static::lazy_static;
use regex::Regex;
use time::{Date, OffsetDateTime};

use crate::error::ApiError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_]+$").unwrap();
    static ref LETTERS_AND_SPACES_RE: Regex = Regex::new(r"^[a-zA-Z\s]+$").unwrap();
}

fn char_len_between(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.chars().count())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if !EMAIL_RE.is_match(email) {
        return Err(ApiError::validation("Invalid email"));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), ApiError> {
    if !char_len_between(username, 3, 20) {
        return Err(ApiError::validation(
            "Username must be between 3 and 20 characters",
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(ApiError::validation(
            "Username may only contain letters, digits and underscores",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if !char_len_between(password, 8, 128) {
        return Err(ApiError::validation(
            "Password must be between 8 and 128 characters",
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(ApiError::validation(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(ApiError::validation(
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation(
            "Password must contain at least one digit",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_punctuation()) {
        return Err(ApiError::validation(
            "Password must contain at least one special character",
        ));
    }
    Ok(())
}

pub fn validate_full_name(full_name: &str) -> Result<(), ApiError> {
    if !char_len_between(full_name, 1, 100) || !LETTERS_AND_SPACES_RE.is_match(full_name) {
        return Err(ApiError::validation(
            "Full name must be 1 to 100 letters or spaces",
        ));
    }
    Ok(())
}

pub fn validate_postal_code(postal_code: &str) -> Result<(), ApiError> {
    if !char_len_between(postal_code, 4, 10) {
        return Err(ApiError::validation(
            "Postal code must be between 4 and 10 characters",
        ));
    }
    Ok(())
}

pub fn validate_city(city: &str) -> Result<(), ApiError> {
    if !char_len_between(city, 1, 85) || !LETTERS_AND_SPACES_RE.is_match(city) {
        return Err(ApiError::validation("City must be 1 to 85 letters or spaces"));
    }
    Ok(())
}

pub fn validate_birth_date(birth_date: Date) -> Result<(), ApiError> {
    if birth_date > OffsetDateTime::now_utc().date() {
        return Err(ApiError::validation("Birth date cannot be in the future"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn message(res: Result<(), ApiError>) -> String {
        res.unwrap_err().to_string()
    }

    #[test]
    fn password_complexity() {
        assert!(validate_password("Abc123!@").is_ok());
        assert!(message(validate_password("Ab1!")).contains("between 8 and 128"));
        assert!(message(validate_password("abc123!@")).contains("uppercase"));
        assert!(message(validate_password("ABC123!@")).contains("lowercase"));
        assert!(message(validate_password("Abcdef!@")).contains("digit"));
        assert!(message(validate_password("Abc12345")).contains("special"));
        assert!(validate_password(&format!("Aa1!{}", "x".repeat(125))).is_err());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("bob_1").is_ok());
        assert!(validate_username("bo").is_err());
        assert!(validate_username(&"a".repeat(21)).is_err());
        assert!(validate_username("bob-1").is_err());
        assert!(validate_username("bob 1").is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("b@x.com").is_ok());
        assert!(validate_email("b@x").is_err());
        assert!(validate_email("b x@y.com").is_err());
    }

    #[test]
    fn profile_fields() {
        assert!(validate_full_name("Bob Builder").is_ok());
        assert!(validate_full_name("Bob3").is_err());
        assert!(validate_postal_code("1000").is_ok());
        assert!(validate_postal_code("100").is_err());
        assert!(validate_city("Ljubljana").is_ok());
        assert!(validate_city("").is_err());
    }

    #[test]
    fn birth_date_not_in_future() {
        assert!(validate_birth_date(date!(1990 - 05 - 17)).is_ok());
        let tomorrow = OffsetDateTime::now_utc().date().next_day().unwrap();
        assert!(validate_birth_date(tomorrow).is_err());
    }
}
