use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user not found")]
    UserNotFound,
    #[error("user already exists")]
    UserAlreadyExists(String),
    #[error("referral code not found")]
    CodeNotFound(i64),
    #[error("referral code already exists")]
    CodeAlreadyExists(i64),
    /// Raised by activation when another code is already active (409).
    #[error("active referral code already exists")]
    ActiveCodeExists,
    /// Same condition hit during creation with immediate activation, reported
    /// as 404. The asymmetry is historical API behavior and is kept as-is.
    #[error("active referral code already exists")]
    ActiveCodeUnavailable,
    #[error("the referral code has expired, please create a new referral code")]
    CodeExpired(i64),
    #[error("you can activate or delete only a referral code created by you")]
    NotCodeOwner,
    #[error("referral code {0} is invalid")]
    InvalidCode(i64),
    #[error("the user {0} does not have any active referral codes")]
    NoActiveCode(String),
    #[error("the address {0} was not found by the email verification provider")]
    EmailUndeliverable(String),
    #[error("user is inactive")]
    InactiveUser,
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Validation(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::UserNotFound
            | DomainError::CodeNotFound(_)
            | DomainError::ActiveCodeUnavailable
            | DomainError::EmailUndeliverable(_) => StatusCode::NOT_FOUND,
            DomainError::UserAlreadyExists(_)
            | DomainError::CodeAlreadyExists(_)
            | DomainError::ActiveCodeExists => StatusCode::CONFLICT,
            DomainError::CodeExpired(_)
            | DomainError::NotCodeOwner
            | DomainError::InvalidCode(_)
            | DomainError::NoActiveCode(_)
            | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::InactiveUser => StatusCode::FORBIDDEN,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = self.to_string();
        let details = match self {
            DomainError::UserAlreadyExists(email) | DomainError::EmailUndeliverable(email) => {
                Some(json!({ "email": email }))
            }
            DomainError::CodeNotFound(code)
            | DomainError::CodeAlreadyExists(code)
            | DomainError::CodeExpired(code)
            | DomainError::InvalidCode(code) => Some(json!({ "code": code })),
            _ => None,
        };
        let body = ErrorBody {
            error: message.as_str(),
            details,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_cases_map_to_409() {
        assert_eq!(
            DomainError::UserAlreadyExists("a@x.com".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            DomainError::CodeAlreadyExists(1234).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            DomainError::ActiveCodeExists.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn occupied_active_slot_at_creation_maps_to_404() {
        assert_eq!(
            DomainError::ActiveCodeUnavailable.status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn rule_violations_map_to_400() {
        assert_eq!(
            DomainError::CodeExpired(1234).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::NotCodeOwner.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::InvalidCode(7).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::NoActiveCode("a@x.com".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn inactive_identity_maps_to_403() {
        assert_eq!(
            DomainError::InactiveUser.status_code(),
            StatusCode::FORBIDDEN
        );
    }
}
