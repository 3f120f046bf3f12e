use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::store::RepoError;

/// Field that collided with an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Username,
    Email,
    Unknown,
}

impl ConflictField {
    /// Maps a violated unique constraint name back to the field it guards.
    pub fn from_constraint(constraint: Option<&str>) -> Self {
        match constraint {
            Some(c) if c.contains("username") => Self::Username,
            Some(c) if c.contains("email") => Self::Email,
            _ => Self::Unknown,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Username => "Username already exists",
            Self::Email => "Email already exists",
            Self::Unknown => "Unique constraint violation",
        }
    }
}

/// Failures raised by the auth and ownership core. Carries no HTTP detail.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid authentication credentials")]
    Unauthenticated,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Not allowed to modify this resource")]
    Forbidden,

    #[error("{}", .0.message())]
    Conflict(ConflictField),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),

    #[error("store error: {0}")]
    Store(RepoError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UniqueViolation { constraint } => {
                Self::Conflict(ConflictField::from_constraint(constraint.as_deref()))
            }
            other => Self::Store(other),
        }
    }
}

/// Boundary error: everything a handler can fail with, rendered as JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Uniqueness conflict hit while modifying an existing record.
    #[error("{}", .0.message())]
    UpdateConflict(ConflictField),

    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Conflicts on an update path are reported as bad requests, not 409.
    pub fn on_update(err: impl Into<ApiError>) -> Self {
        match err.into() {
            Self::Domain(DomainError::Conflict(field)) => Self::UpdateConflict(field),
            other => other,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        Self::Domain(err.into())
    }
}

// Extractor rejections keep axum's message but use our status and body shape.

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let challenge = match &self {
            Self::Domain(DomainError::Unauthenticated | DomainError::InvalidCredentials) => {
                Some(HeaderValue::from_static("Bearer"))
            }
            Self::Domain(DomainError::Forbidden) => Some(HeaderValue::from_static(
                r#"Bearer error="insufficient_scope""#,
            )),
            _ => None,
        };

        let (status, detail) = match &self {
            Self::Domain(DomainError::Unauthenticated | DomainError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            Self::Domain(DomainError::Forbidden) => (StatusCode::FORBIDDEN, self.to_string()),
            Self::Domain(DomainError::Conflict(_)) => (StatusCode::CONFLICT, self.to_string()),
            Self::Domain(DomainError::NotFound(_)) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::UpdateConflict(field) => {
                warn!(?field, "update rejected by unique constraint");
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::Domain(
                e @ (DomainError::InternalConsistency(_)
                | DomainError::Store(_)
                | DomainError::Internal(_)),
            ) => {
                error!(error = %e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut res = (status, Json(json!({ "detail": detail }))).into_response();
        if let Some(value) = challenge {
            res.headers_mut().insert(header::WWW_AUTHENTICATE, value);
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_names_map_to_fields() {
        assert_eq!(
            ConflictField::from_constraint(Some("users_username_key")),
            ConflictField::Username
        );
        assert_eq!(
            ConflictField::from_constraint(Some("users_email_key")),
            ConflictField::Email
        );
        assert_eq!(
            ConflictField::from_constraint(Some("users_session_token_key")),
            ConflictField::Unknown
        );
        assert_eq!(ConflictField::from_constraint(None), ConflictField::Unknown);
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let err: DomainError = RepoError::UniqueViolation {
            constraint: Some("users_email_key".into()),
        }
        .into();
        assert!(matches!(err, DomainError::Conflict(ConflictField::Email)));
    }

    #[test]
    fn unauthenticated_carries_bearer_challenge() {
        let res = ApiError::from(DomainError::Unauthenticated).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn credential_failures_share_status_and_challenge() {
        let res = ApiError::from(DomainError::InvalidCredentials).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn forbidden_is_403() {
        let res = ApiError::from(DomainError::Forbidden).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn conflict_status_depends_on_path() {
        let create = ApiError::from(DomainError::Conflict(ConflictField::Username));
        assert_eq!(create.into_response().status(), StatusCode::CONFLICT);

        let update = ApiError::on_update(DomainError::Conflict(ConflictField::Username));
        assert!(matches!(update, ApiError::UpdateConflict(ConflictField::Username)));
        assert_eq!(update.to_string(), "Username already exists");
        assert_eq!(update.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_consistency_is_500() {
        let err = ApiError::from(DomainError::InternalConsistency("dup".into()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
