use std::sync::Arc;

use tracing::{instrument, warn};

use crate::data::referral_code_repository::ReferralCodeRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::referral_code::{self, ReferralCode};
use crate::domain::user::{NewUser, User, UserUpdate};
use crate::infrastructure::email::{ReferralInvite, ReferralMailer};
use crate::infrastructure::email_verify::EmailVerifier;
use crate::infrastructure::security::hash_password;
use crate::presentation::dto::{CreateUserRequest, UpdateUserRequest};

const REGISTRATION_LINK_LABEL: &str = "End registration";

/// Registration flows: direct sign-up, invitation mail, and sign-up through
/// a referral code, plus the profile and referral-tree queries.
#[derive(Clone)]
pub struct UserService<U, C>
where
    U: UserRepository + 'static,
    C: ReferralCodeRepository + 'static,
{
    users: Arc<U>,
    codes: Arc<C>,
    mailer: Arc<dyn ReferralMailer>,
    verifier: Arc<dyn EmailVerifier>,
    registration_url: String,
}

impl<U, C> UserService<U, C>
where
    U: UserRepository + 'static,
    C: ReferralCodeRepository + 'static,
{
    pub fn new(
        users: Arc<U>,
        codes: Arc<C>,
        mailer: Arc<dyn ReferralMailer>,
        verifier: Arc<dyn EmailVerifier>,
        registration_url: String,
    ) -> Self {
        Self {
            users,
            codes,
            mailer,
            verifier,
            registration_url,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn register(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(DomainError::UserAlreadyExists(request.email));
        }
        let hash =
            hash_password(&request.password).map_err(|e| DomainError::Internal(e.to_string()))?;
        self.users
            .create(NewUser {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                password_hash: hash,
                referred_by: 0,
            })
            .await
    }

    /// Looks up the referrer's active code and mails it to the recipient.
    /// The mail leaves on a detached task: the caller is answered before
    /// delivery is attempted, and a failed delivery is only logged.
    #[instrument(skip(self))]
    pub async fn request_referral(
        &self,
        referrer_email: &str,
        recipient_email: &str,
    ) -> Result<(), DomainError> {
        let referrer = self
            .users
            .find_by_email(referrer_email)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        let active = self
            .codes
            .find_active_by_user(referrer.id)
            .await?
            .ok_or_else(|| DomainError::NoActiveCode(referrer_email.to_string()))?;

        let invite = ReferralInvite {
            to: recipient_email.to_string(),
            username: recipient_email.to_string(),
            code: active.code,
            link: self.registration_url.clone(),
            link_label: REGISTRATION_LINK_LABEL.to_string(),
        };
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            if let Err(err) = mailer.send_referral_code(&invite).await {
                warn!(error = %err, to = %invite.to, "referral email dispatch failed");
            }
        });

        Ok(())
    }

    /// Redeeming a code links the new user to the code's owner. The code is
    /// not consumed or deactivated; any number of users may register through
    /// the same code.
    #[instrument(skip(self, request))]
    pub async fn register_with_code(
        &self,
        code: i64,
        request: CreateUserRequest,
    ) -> Result<User, DomainError> {
        if !referral_code::is_valid_code(code) {
            return Err(DomainError::InvalidCode(code));
        }
        let stored = self
            .codes
            .find_by_code(code)
            .await?
            .ok_or(DomainError::CodeNotFound(code))?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(DomainError::UserAlreadyExists(request.email));
        }
        let hash =
            hash_password(&request.password).map_err(|e| DomainError::Internal(e.to_string()))?;
        self.users
            .create(NewUser {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                password_hash: hash,
                referred_by: stored.user_id,
            })
            .await
    }

    pub async fn get_user(&self, email: &str) -> Result<(User, Vec<ReferralCode>), DomainError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        let codes = self.codes.find_by_user(user.id).await?;
        Ok((user, codes))
    }

    pub async fn get_referrals(&self, referrer_id: i64) -> Result<Vec<User>, DomainError> {
        let referrer = self
            .users
            .find_by_id(referrer_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        self.users.find_referrals(referrer.id).await
    }

    /// The supplied password is hashed and stored even when it matches the
    /// current one; the update request always carries the full credential.
    #[instrument(skip(self, request))]
    pub async fn update_user(
        &self,
        email: &str,
        request: UpdateUserRequest,
    ) -> Result<User, DomainError> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        let hash =
            hash_password(&request.password).map_err(|e| DomainError::Internal(e.to_string()))?;
        self.users
            .update_by_email(
                email,
                UserUpdate {
                    email: request.email,
                    first_name: request.first_name,
                    last_name: request.last_name,
                    password_hash: hash,
                },
            )
            .await?
            .ok_or(DomainError::UserNotFound)
    }

    /// Asks the external verifier whether the address is deliverable, then
    /// resolves it to a local account. Both a provider miss and a missing
    /// local account surface as 404.
    #[instrument(skip(self))]
    pub async fn check_email_deliverability(&self, email: &str) -> Result<User, DomainError> {
        if !self.verifier.exists(email).await? {
            return Err(DomainError::EmailUndeliverable(email.to_string()));
        }
        self.users
            .find_by_email(email)
            .await?
            .ok_or(DomainError::UserNotFound)
    }
}
