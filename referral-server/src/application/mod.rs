pub mod auth_service;
pub mod referral_code_service;
pub mod user_service;
