use std::sync::Arc;

use tracing::instrument;

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, verify_password};

#[derive(Clone)]
pub struct AuthService<R: UserRepository + 'static> {
    repo: Arc<R>,
    keys: JwtKeys,
}

impl<R> AuthService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Resolves a token subject to an account, rejecting deactivated ones.
    pub async fn get_active_user(&self, id: i64) -> Result<User, DomainError> {
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::Unauthorized)?;
        if !user.is_active {
            return Err(DomainError::InactiveUser);
        }
        Ok(user)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, DomainError> {
        let user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid =
            verify_password(password, &user.password_hash).map_err(|_| DomainError::Unauthorized)?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }
        if !user.is_active {
            return Err(DomainError::InactiveUser);
        }

        self.keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryUserRepository;
    use crate::domain::user::NewUser;
    use crate::infrastructure::security::hash_password;

    async fn seeded() -> (AuthService<InMemoryUserRepository>, Arc<InMemoryUserRepository>, i64)
    {
        let repo = Arc::new(InMemoryUserRepository::new());
        let user = repo
            .create(NewUser {
                email: "a@x.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                password_hash: hash_password("s3cret").unwrap(),
                referred_by: 0,
            })
            .await
            .unwrap();
        let service = AuthService::new(Arc::clone(&repo), JwtKeys::new("test-secret".into()));
        (service, repo, user.id)
    }

    #[tokio::test]
    async fn login_issues_a_token_for_the_account() {
        let (service, _, id) = seeded().await;
        let token = service.login("a@x.com", "s3cret").await.unwrap();
        let claims = service.keys().verify_token(&token).unwrap();
        assert_eq!(claims.user_id(), Some(id));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (service, _, _) = seeded().await;
        let err = service.login("a@x.com", "nope").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }

    #[tokio::test]
    async fn unknown_email_is_unauthorized() {
        let (service, _, _) = seeded().await;
        let err = service.login("ghost@x.com", "s3cret").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }

    #[tokio::test]
    async fn deactivated_account_is_forbidden() {
        let (service, repo, id) = seeded().await;
        repo.deactivate(id);

        let err = service.get_active_user(id).await.unwrap_err();
        assert!(matches!(err, DomainError::InactiveUser));

        let err = service.login("a@x.com", "s3cret").await.unwrap_err();
        assert!(matches!(err, DomainError::InactiveUser));
    }
}
