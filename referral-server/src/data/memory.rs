//! In-memory repository implementations for service-level tests. They mirror
//! the constraint behavior of the Postgres schema: unique email, unique code
//! value, and the single-active partial index.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::data::referral_code_repository::ReferralCodeRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::referral_code::{NewReferralCode, ReferralCode};
use crate::domain::user::{NewUser, User, UserUpdate};

pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn deactivate(&self, id: i64) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.is_active = false;
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::UserAlreadyExists(user.email));
        }
        let now = Utc::now();
        let created = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            is_active: true,
            referred_by: user.referred_by,
            registered_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_referrals(&self, referrer_id: i64) -> Result<Vec<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.referred_by == referrer_id)
            .cloned()
            .collect())
    }

    async fn update_by_email(
        &self,
        email: &str,
        update: UserUpdate,
    ) -> Result<Option<User>, DomainError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == update.email && u.email != email)
        {
            return Err(DomainError::UserAlreadyExists(update.email));
        }
        let Some(user) = users.iter_mut().find(|u| u.email == email) else {
            return Ok(None);
        };
        user.email = update.email;
        user.first_name = update.first_name;
        user.last_name = update.last_name;
        user.password_hash = update.password_hash;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

pub struct InMemoryReferralCodeRepository {
    codes: Mutex<Vec<ReferralCode>>,
    next_id: AtomicI64,
}

impl InMemoryReferralCodeRepository {
    pub fn new() -> Self {
        Self {
            codes: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Rewrites a stored code's expiry, standing in for the passage of time.
    pub fn set_exp_date(&self, code: i64, exp_date: NaiveDate) {
        let mut codes = self.codes.lock().unwrap();
        if let Some(stored) = codes.iter_mut().find(|c| c.code == code) {
            stored.exp_date = exp_date;
        }
    }

    pub fn len(&self) -> usize {
        self.codes.lock().unwrap().len()
    }
}

#[async_trait]
impl ReferralCodeRepository for InMemoryReferralCodeRepository {
    async fn create(&self, code: NewReferralCode) -> Result<ReferralCode, DomainError> {
        let mut codes = self.codes.lock().unwrap();
        if codes.iter().any(|c| c.code == code.code) {
            return Err(DomainError::CodeAlreadyExists(code.code));
        }
        if code.is_active && codes.iter().any(|c| c.is_active) {
            return Err(DomainError::ActiveCodeExists);
        }
        let created = ReferralCode {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            code: code.code,
            exp_date: code.exp_date,
            is_active: code.is_active,
            user_id: code.user_id,
        };
        codes.push(created.clone());
        Ok(created)
    }

    async fn find_by_code(&self, code: i64) -> Result<Option<ReferralCode>, DomainError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.code == code)
            .cloned())
    }

    async fn find_active(&self) -> Result<Option<ReferralCode>, DomainError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.is_active)
            .cloned())
    }

    async fn find_active_by_user(&self, user_id: i64) -> Result<Option<ReferralCode>, DomainError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.is_active && c.user_id == user_id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<ReferralCode>, DomainError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn activate(&self, code: i64, user_id: i64) -> Result<Option<ReferralCode>, DomainError> {
        let mut codes = self.codes.lock().unwrap();
        if codes.iter().any(|c| c.is_active && c.code != code) {
            return Ok(None);
        }
        let Some(stored) = codes
            .iter_mut()
            .find(|c| c.code == code && c.user_id == user_id)
        else {
            return Ok(None);
        };
        stored.is_active = true;
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, code: i64, user_id: i64) -> Result<u64, DomainError> {
        let mut codes = self.codes.lock().unwrap();
        let before = codes.len();
        codes.retain(|c| !(c.code == code && c.user_id == user_id));
        Ok((before - codes.len()) as u64)
    }
}
