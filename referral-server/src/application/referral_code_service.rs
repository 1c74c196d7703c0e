use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::instrument;

use crate::data::referral_code_repository::ReferralCodeRepository;
use crate::domain::error::DomainError;
use crate::domain::referral_code::{NewReferralCode, ReferralCode};
use crate::presentation::dto::CreateReferralCodeRequest;

/// Enforces the referral code lifecycle: creation with a unique value,
/// a single active code across the whole system, activation guarded by
/// expiry and ownership, and owner-only deletion.
#[derive(Clone)]
pub struct ReferralCodeService<R: ReferralCodeRepository + 'static> {
    repo: Arc<R>,
}

impl<R> ReferralCodeService<R>
where
    R: ReferralCodeRepository + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn create_code(
        &self,
        user_id: i64,
        request: CreateReferralCodeRequest,
    ) -> Result<ReferralCode, DomainError> {
        if self.repo.find_by_code(request.code).await?.is_some() {
            return Err(DomainError::CodeAlreadyExists(request.code));
        }

        let exp_date = Utc::now().date_naive() + Duration::days(request.days);

        if request.is_active && self.repo.find_active().await?.is_some() {
            // Reported as 404 rather than 409, unlike activation below.
            return Err(DomainError::ActiveCodeUnavailable);
        }

        self.repo
            .create(NewReferralCode {
                code: request.code,
                exp_date,
                is_active: request.is_active,
                user_id,
            })
            .await
    }

    /// Checks run in a fixed order: existence, free active slot, expiry,
    /// ownership. Ownership is re-verified here even though the caller is
    /// authenticated; holding a valid token says nothing about who created
    /// the code.
    #[instrument(skip(self))]
    pub async fn activate_code(
        &self,
        code: i64,
        user_id: i64,
    ) -> Result<ReferralCode, DomainError> {
        let stored = self
            .repo
            .find_by_code(code)
            .await?
            .ok_or(DomainError::CodeNotFound(code))?;

        if let Some(active) = self.repo.find_active().await? {
            if active.code != code {
                return Err(DomainError::ActiveCodeExists);
            }
        }

        if stored.is_expired(Utc::now().date_naive()) {
            return Err(DomainError::CodeExpired(code));
        }

        if stored.user_id != user_id {
            return Err(DomainError::NotCodeOwner);
        }

        // The update is scoped to (code, user_id); None here means another
        // code grabbed the active slot between the check above and the write.
        self.repo
            .activate(code, user_id)
            .await?
            .ok_or(DomainError::ActiveCodeExists)
    }

    #[instrument(skip(self))]
    pub async fn delete_code(&self, code: i64, user_id: i64) -> Result<(), DomainError> {
        let stored = self
            .repo
            .find_by_code(code)
            .await?
            .ok_or(DomainError::CodeNotFound(code))?;

        if stored.user_id != user_id {
            return Err(DomainError::NotCodeOwner);
        }

        self.repo.delete(code, user_id).await?;
        Ok(())
    }
}
