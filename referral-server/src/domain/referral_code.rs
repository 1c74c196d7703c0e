use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lowest code value accepted at redemption.
pub const CODE_MIN: i64 = 1_000;
/// Highest code value accepted at redemption.
pub const CODE_MAX: i64 = 999_999;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReferralCode {
    pub id: i64,
    pub code: i64,
    pub exp_date: NaiveDate,
    pub is_active: bool,
    pub user_id: i64,
}

impl ReferralCode {
    /// Expiry is evaluated against a date, never swept proactively: an
    /// expired code stays stored and only fails at activation time.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.exp_date < today
    }
}

#[derive(Debug, Clone)]
pub struct NewReferralCode {
    pub code: i64,
    pub exp_date: NaiveDate,
    pub is_active: bool,
    pub user_id: i64,
}

/// Code values redeemable at registration are 4 to 6 digits.
pub fn is_valid_code(code: i64) -> bool {
    (CODE_MIN..=CODE_MAX).contains(&code)
}
