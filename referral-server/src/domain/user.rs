use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. `referred_by` holds the id of the user whose code
/// was redeemed at registration, or 0 when the user registered directly.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub referred_by: i64,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload; id and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub referred_by: i64,
}

/// Enumerated profile update. Every field is applied; the password hash is
/// always replaced with a freshly computed one.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}
