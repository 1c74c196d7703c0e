pub mod referral_code_repository;
pub mod user_repository;

#[cfg(test)]
pub mod memory;
