pub mod auth;
pub mod referral_code;
pub mod user;
