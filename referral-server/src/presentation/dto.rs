use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::referral_code::ReferralCode;
use crate::domain::user::User;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 30))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Same shape as registration: every field, password included, is supplied
/// on update.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 30))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// ======================= Referral codes =======================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReferralCodeRequest {
    pub code: i64,
    #[validate(range(min = 0))]
    pub days: i64,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CodeQuery {
    pub referral_code: i64,
}

// ======================= Queries =======================

#[derive(Debug, Deserialize, Validate)]
pub struct ReferralEmailQuery {
    #[validate(email)]
    pub referrer_email: String,
    #[validate(email)]
    pub user_email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmailQuery {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ReferrerQuery {
    pub referrer_id: i64,
}

// ======================= Views =======================

#[derive(Debug, Serialize)]
pub struct ReferralCodeView {
    pub id: i64,
    pub code: i64,
    pub is_active: bool,
    pub exp_date: NaiveDate,
}

impl From<ReferralCode> for ReferralCodeView {
    fn from(code: ReferralCode) -> Self {
        Self {
            id: code.id,
            code: code.code,
            is_active: code.is_active,
            exp_date: code.exp_date,
        }
    }
}

/// Outward user representation; the password hash never leaves the service.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub referral_codes: Vec<ReferralCodeView>,
}

impl UserView {
    pub fn with_codes(user: User, codes: Vec<ReferralCode>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            registered_at: user.registered_at,
            updated_at: user.updated_at,
            referral_codes: codes.into_iter().map(ReferralCodeView::from).collect(),
        }
    }
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView::with_codes(user, Vec::new())
    }
}
